use esp_hal::{
    gpio::RtcPin,
    rtc_cntl::{
        Rtc,
        sleep::{RtcioWakeupSource, WakeupLevel},
    },
};
use log::info;

const MICROS_PER_SEC: u64 = 1_000_000;

/// Wall clock on the low-power RTC timer, which keeps counting through deep
/// sleep.
pub struct RtcWallClock<'d> {
    rtc: Rtc<'d>,
}

impl<'d> RtcWallClock<'d> {
    /// Wraps the RTC. A counter still behind `floor_unix` has never been set
    /// and is moved forward to it.
    pub fn new(rtc: Rtc<'d>, floor_unix: u64) -> Self {
        let mut clock = Self { rtc };
        if clock.now_unix() < floor_unix as i64 {
            info!("clock: rtc unset, starting from {}", floor_unix);
            clock
                .rtc
                .set_current_time_us(floor_unix.saturating_mul(MICROS_PER_SEC));
        }
        clock
    }

    /// Seconds since the Unix epoch.
    pub fn now_unix(&self) -> i64 {
        (self.rtc.current_time_us() / MICROS_PER_SEC) as i64
    }

    /// Powers down until `wake` is pulled low.
    pub fn sleep_until_pressed(&mut self, wake: &mut dyn RtcPin) -> ! {
        let mut wake_pins: [(&mut dyn RtcPin, WakeupLevel); 1] = [(wake, WakeupLevel::Low)];
        let wake_source = RtcioWakeupSource::new(&mut wake_pins);
        self.rtc.sleep_deep(&[&wake_source]);
    }
}
