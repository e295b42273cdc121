use chronowatch_hal_esp32s3::platform::clock::RtcWallClock;
use esp_hal::peripherals::GPIO6;

/// Deep sleep until Select is pressed. The RTC keeps counting so a running
/// chronometer catches up on the next boot.
pub(super) fn enter_deep_sleep(clock: &mut RtcWallClock<'_>) -> ! {
    // The pin is also owned by the button driver, which never runs again.
    let mut wake_select = unsafe { GPIO6::steal() };
    clock.sleep_until_pressed(&mut wake_select);
}
