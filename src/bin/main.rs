#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use chronowatch_core::{
    app::{ChronoApp, ChronoConfig, TickResult},
    persist::{self, Restore},
    splits::SPLITS_CAPACITY,
    timebase::CivilTime,
};
use chronowatch_hal_esp32s3::{
    input::buttons::{ButtonConfig, ButtonInput},
    platform::clock::RtcWallClock,
    storage::flash_records::FlashRecordStore,
};
use embassy_executor::Spawner;
use embassy_time::Timer;
use esp_hal::{
    clock::CpuClock,
    gpio::{Input, InputConfig, Pull},
    rtc_cntl::{Rtc, SocResetReason, reset_reason, wakeup_cause},
    system::Cpu,
    time::Instant,
    timer::timg::TimerGroup,
};
use log::{LevelFilter, debug, info, warn};

#[path = "main/power.rs"]
mod power;

const TITLE: &str = "Chronowatch";
const CLOCK_24H: bool = false;
const POLL_INTERVAL_MS: u64 = 1;
const BUTTON_DEBOUNCE_POLLS: u8 = 3;
const LONG_PRESS_MS: u64 = 500;
/// 2024-01-01T00:00:00Z, used until the RTC has been set.
const DEFAULT_EPOCH_UNIX: u64 = 1_704_067_200;

fn fallback_epoch() -> u64 {
    option_env!("CHRONOWATCH_EPOCH")
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_EPOCH_UNIX)
}

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[allow(
    clippy::large_stack_frames,
    reason = "the app and its split buffer live on main's stack"
)]
#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);
    esp_println::println!("boot: chronowatch starting");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);
    let boot_reset_reason = reset_reason(Cpu::ProCpu);
    let woke_from_deep_sleep = boot_reset_reason == Some(SocResetReason::CoreDeepSleep);
    info!(
        "boot reset_reason={:?} wakeup_cause={:?}",
        boot_reset_reason,
        wakeup_cause()
    );

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let mut clock = RtcWallClock::new(Rtc::new(peripherals.LPWR), fallback_epoch());

    // Button wiring: BACK=GPIO4, UP=GPIO5, SELECT=GPIO6, DOWN=GPIO7, all to GND.
    let input_cfg = InputConfig::default().with_pull(Pull::Up);
    let pins = [
        Input::new(peripherals.GPIO4, input_cfg),
        Input::new(peripherals.GPIO5, input_cfg),
        Input::new(peripherals.GPIO6, input_cfg),
        Input::new(peripherals.GPIO7, input_cfg),
    ];
    let button_config = ButtonConfig::default()
        .with_active_low(true)
        .with_debounce_polls(BUTTON_DEBOUNCE_POLLS)
        .with_long_press_polls((LONG_PRESS_MS / POLL_INTERVAL_MS) as u16);
    let input = match ButtonInput::new(pins, button_config) {
        Ok(input) => input,
        Err(err) => {
            info!("buttons: init failed: {:?}", err);
            loop {
                Timer::after_secs(1).await;
            }
        }
    };

    let chrono_config = ChronoConfig::default()
        .with_clock_24h(CLOCK_24H)
        .with_title(TITLE);
    let mut app: ChronoApp<_, SPLITS_CAPACITY> = ChronoApp::new(input, chrono_config);

    let mut record_store = match FlashRecordStore::new() {
        Ok(store) => Some(store),
        Err(err) => {
            info!("storage unavailable ({:?}); state will be volatile", err);
            None
        }
    };

    if let Some(store) = record_store.as_mut() {
        match persist::load::<_, SPLITS_CAPACITY>(store, clock.now_unix()) {
            Restore::Restored(state) => app.restore(state),
            Restore::Defaults => {
                if woke_from_deep_sleep {
                    warn!("boot: woke from sleep without a usable saved state");
                }
            }
        }
    }

    info!("Buttons: BACK=GPIO4 UP=GPIO5 SELECT=GPIO6 DOWN=GPIO7");
    info!(
        "Chronowatch started: splits_capacity={} long_press_ms={} reset_hold_ms={}",
        SPLITS_CAPACITY,
        LONG_PRESS_MS,
        app.config().reset_hold_ms
    );

    let loop_start = Instant::now();
    let mut last_second = clock.now_unix();
    app.with_screen(|screen| info!("screen: {:?}", screen));

    loop {
        let now_ms = loop_start.elapsed().as_millis();
        let mut render = match app.tick(now_ms) {
            TickResult::CloseRequested => {
                app.abandon_reset();
                let close_unix = clock.now_unix();
                let state = app.snapshot(close_unix);
                match record_store.as_mut() {
                    Some(store) => match persist::save(store, &state) {
                        Ok(()) => info!("sleep: state persisted at {}", close_unix),
                        Err(err) => info!("sleep: failed to persist state: {:?}", err),
                    },
                    None => info!("sleep: no storage, state is lost"),
                }
                power::enter_deep_sleep(&mut clock);
            }
            TickResult::RenderRequested => true,
            TickResult::NoRender => false,
        };

        let now_unix = clock.now_unix();
        if now_unix != last_second {
            let behind = now_unix - last_second;
            if behind > 1 {
                debug!("clock: loop stalled, crediting {}s", behind - 1);
                app.catch_up(u32::try_from(behind - 1).unwrap_or(u32::MAX));
            } else if behind < 0 {
                debug!("clock: moved back by {}s, resyncing", -behind);
            }
            render |= app.on_second(CivilTime::from_unix(now_unix)) == TickResult::RenderRequested;
            last_second = now_unix;
        }

        if render {
            app.with_screen(|screen| info!("screen: {:?}", screen));
        }

        Timer::after_millis(POLL_INTERVAL_MS).await;
    }
}
