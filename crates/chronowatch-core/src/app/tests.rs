use super::*;
use crate::{
    input::{Button, ButtonEvent, InputProvider, mock::MockInput},
    persist::{self, Restore},
    render::Screen,
    splits::SPLITS_CAPACITY,
    storage::memory::MemoryRecordStore,
};

/// Replays events; a `None` entry ends the batch drained by one tick.
struct ScriptedInput<'a> {
    events: &'a [Option<ButtonEvent>],
    cursor: usize,
}

impl<'a> ScriptedInput<'a> {
    const fn new(events: &'a [Option<ButtonEvent>]) -> Self {
        Self { events, cursor: 0 }
    }
}

impl InputProvider for ScriptedInput<'_> {
    type Error = ();

    fn poll_event(&mut self) -> Result<Option<ButtonEvent>, Self::Error> {
        let Some(slot) = self.events.get(self.cursor).copied() else {
            return Ok(None);
        };
        self.cursor = self.cursor.saturating_add(1);
        Ok(slot)
    }
}

const END: Option<ButtonEvent> = None;
// 2020-09-30T00:00:00Z
const BASE_UNIX: i64 = 1_601_424_000;

const fn click(button: Button) -> Option<ButtonEvent> {
    Some(ButtonEvent::click(button))
}

const fn long(button: Button) -> Option<ButtonEvent> {
    Some(ButtonEvent::long_press(button))
}

const fn press(button: Button) -> Option<ButtonEvent> {
    Some(ButtonEvent::pressed(button))
}

const fn release(button: Button) -> Option<ButtonEvent> {
    Some(ButtonEvent::released(button))
}

fn make_app<const N: usize>(events: &[Option<ButtonEvent>]) -> ChronoApp<ScriptedInput<'_>, N> {
    ChronoApp::new(
        ScriptedInput::new(events),
        ChronoConfig::default().with_title("Test"),
    )
}

fn seconds<IN: InputProvider, const N: usize>(app: &mut ChronoApp<IN, N>, from: i64, count: i64) {
    for offset in 1..=count {
        app.on_second(CivilTime::from_unix(BASE_UNIX + from + offset));
    }
}

/// `(first_number, visible_lines, total)` when the splits view is shown.
fn visible_splits<IN: InputProvider, const N: usize>(
    app: &ChronoApp<IN, N>,
) -> Option<(usize, usize, usize)> {
    let mut seen = None;
    app.with_screen(|screen| {
        if let Screen::Splits {
            lines,
            first_number,
            total,
            ..
        } = screen
        {
            seen = Some((first_number, lines.len(), total));
        }
    });
    seen
}

#[test]
fn running_chronometer_counts_every_second_in_background() {
    let events = [long(Button::Up), click(Button::Select), END, long(Button::Up), END];
    let mut app = make_app::<3>(&events);

    app.tick(0);
    assert_eq!(app.mode(), DisplayMode::Chronometer);
    assert_eq!(app.run_state(), RunState::Running);
    seconds(&mut app, 0, 5);
    assert_eq!(app.time_text(), " 0:00:05");

    app.tick(10);
    assert_eq!(app.mode(), DisplayMode::Clock);
    seconds(&mut app, 5, 5);
    assert_eq!(app.elapsed_secs(), 10);
}

#[test]
fn stopped_chronometer_ignores_ticks() {
    let events = [long(Button::Up), END];
    let mut app = make_app::<3>(&events);

    app.tick(0);
    seconds(&mut app, 0, 30);
    assert_eq!(app.elapsed_secs(), 0);
    assert_eq!(app.time_text(), " 0:00:00");
}

#[test]
fn clock_face_shows_time_date_and_options_label() {
    let events = [END];
    let mut app = make_app::<3>(&events);
    assert_eq!(app.action_label(), "Options");

    let result = app.on_second(CivilTime::from_unix(BASE_UNIX + 13 * 3_600 + 5 * 60 + 9));
    assert_eq!(result, TickResult::RenderRequested);
    assert_eq!(app.time_text(), "1:05:09");
    assert_eq!(app.date_text(), "Wed Sep 30");
}

#[test]
fn entering_chronometer_shows_reset_affordance_when_stopped() {
    let events = [long(Button::Up), END];
    let mut app = make_app::<3>(&events);

    app.tick(0);
    assert_eq!(app.date_text(), "CHRONO");
    assert_eq!(app.time_text(), " 0:00:00");
    assert_eq!(app.action_label(), "Reset");
}

#[test]
fn early_release_aborts_reset_and_restores_readout() {
    let events = [
        long(Button::Up),
        click(Button::Select),
        END,
        click(Button::Select),
        END,
        press(Button::Down),
        END,
        release(Button::Down),
        END,
    ];
    let mut app = make_app::<3>(&events);

    app.tick(0);
    seconds(&mut app, 0, 5);
    app.tick(100);
    assert_eq!(app.run_state(), RunState::Stopped);
    assert_eq!(app.action_label(), "Reset");

    app.tick(1_000);
    assert_eq!(app.time_text(), "HOLD");
    assert_eq!(app.reset_phase(), ResetPhase::Holding);
    seconds(&mut app, 5, 1);
    assert_eq!(app.time_text(), "HOLD");

    app.tick(1_500);
    assert_eq!(app.reset_phase(), ResetPhase::Idle);
    assert_eq!(app.elapsed_secs(), 5);
    assert_eq!(app.time_text(), " 0:00:05");
    assert_eq!(app.action_label(), "Reset");
    assert!(!app.has_been_reset());

    app.tick(5_000);
    assert_eq!(app.elapsed_secs(), 5);
}

#[test]
fn held_reset_commits_and_clears_splits() {
    let events = [
        long(Button::Up),
        click(Button::Select),
        END,
        click(Button::Down),
        END,
        click(Button::Down),
        click(Button::Select),
        END,
        press(Button::Down),
        END,
        END,
        release(Button::Down),
        END,
        press(Button::Down),
        END,
    ];
    let mut app = make_app::<3>(&events);

    app.tick(0);
    seconds(&mut app, 0, 3);
    app.tick(10);
    seconds(&mut app, 3, 3);
    app.tick(20);
    assert_eq!(app.splits().as_slice(), &[3, 6]);

    app.tick(1_000);
    app.tick(2_000);
    assert_eq!(app.reset_phase(), ResetPhase::Committed);
    assert_eq!(app.elapsed_secs(), 0);
    assert_eq!(app.time_text(), " 0:00:00");
    assert_eq!(app.action_label(), "");
    assert_eq!(app.splits().split_index(), -1);

    app.tick(2_100);
    assert_eq!(app.reset_phase(), ResetPhase::Idle);
    assert!(app.has_been_reset());
    assert_eq!(app.action_label(), "");

    // Already reset: a new press is not a reset session.
    app.tick(3_000);
    assert_eq!(app.reset_phase(), ResetPhase::Idle);
}

#[test]
fn closing_mid_hold_restores_the_held_readout() {
    let events = [
        long(Button::Up),
        click(Button::Select),
        END,
        click(Button::Select),
        END,
        press(Button::Down),
        END,
    ];
    let mut app = make_app::<3>(&events);

    app.tick(0);
    seconds(&mut app, 0, 7);
    app.tick(100);
    app.tick(1_000);
    assert_eq!(app.time_text(), "HOLD");

    app.abandon_reset();
    assert_eq!(app.reset_phase(), ResetPhase::Idle);
    assert_eq!(app.elapsed_secs(), 7);
    assert_eq!(app.time_text(), " 0:00:07");
    assert_eq!(app.action_label(), "Reset");
    assert!(!app.has_been_reset());

    let state = app.snapshot(BASE_UNIX);
    assert_eq!(state.time_text.as_str(), " 0:00:07");
    assert_eq!(state.elapsed_secs, 7);
}

#[test]
fn closing_after_commit_keeps_the_reset() {
    let events = [
        long(Button::Up),
        click(Button::Select),
        END,
        click(Button::Select),
        END,
        press(Button::Down),
        END,
        END,
    ];
    let mut app = make_app::<3>(&events);

    app.tick(0);
    seconds(&mut app, 0, 4);
    app.tick(100);
    app.tick(1_000);
    app.tick(2_000);
    assert_eq!(app.reset_phase(), ResetPhase::Committed);

    app.abandon_reset();
    assert_eq!(app.reset_phase(), ResetPhase::Idle);
    assert_eq!(app.elapsed_secs(), 0);
    assert_eq!(app.time_text(), " 0:00:00");
    assert!(app.has_been_reset());
    assert_eq!(app.action_label(), "");
    assert!(app.snapshot(BASE_UNIX).has_been_reset);
}

#[test]
fn reset_keeps_splits_when_option_is_off() {
    let events = [
        click(Button::Down),
        click(Button::Select),
        click(Button::Back),
        long(Button::Up),
        click(Button::Select),
        END,
        click(Button::Down),
        click(Button::Select),
        END,
        press(Button::Down),
        END,
        END,
        release(Button::Down),
        END,
    ];
    let mut app = make_app::<3>(&events);

    app.tick(0);
    assert!(!app.options().reset_clears_splits);
    seconds(&mut app, 0, 4);
    app.tick(10);
    app.tick(1_000);
    app.tick(2_000);
    app.tick(2_100);

    assert_eq!(app.elapsed_secs(), 0);
    assert!(app.has_been_reset());
    assert_eq!(app.splits().as_slice(), &[4]);
}

#[test]
fn keep_oldest_split_button_reports_full() {
    let events = [
        long(Button::Up),
        click(Button::Select),
        END,
        click(Button::Down),
        END,
        click(Button::Down),
        END,
        click(Button::Down),
        END,
        click(Button::Down),
        END,
    ];
    let mut app = make_app::<3>(&events);

    app.tick(0);
    assert_eq!(app.action_label(), "Split 1");
    let mut labels = std::vec::Vec::new();
    for step in 0..4 {
        seconds(&mut app, step, 1);
        app.tick(100 * (step as u64 + 1));
        labels.push(std::string::String::from(app.action_label()));
    }

    assert_eq!(labels, ["Split 2", "Split 3", "Split Full", "Split Full"]);
    assert_eq!(app.splits().as_slice(), &[1, 2, 3]);
}

#[test]
fn keep_latest_split_button_reuses_last_slot() {
    let events = [
        click(Button::Down),
        click(Button::Down),
        click(Button::Select),
        click(Button::Back),
        long(Button::Up),
        click(Button::Select),
        END,
        click(Button::Down),
        END,
        click(Button::Down),
        END,
        click(Button::Down),
        END,
        click(Button::Down),
        END,
    ];
    let mut app = make_app::<3>(&events);

    app.tick(0);
    assert_eq!(app.options().splits_overflow, OverflowPolicy::KeepLatest);
    for step in 0..4 {
        seconds(&mut app, step, 1);
        app.tick(100 * (step as u64 + 1));
    }

    assert_eq!(app.action_label(), "Split 3");
    assert_eq!(app.splits().as_slice(), &[2, 3, 4]);
}

#[test]
fn splits_screen_pages_and_clears_through_confirmation() {
    let mut events = std::vec::Vec::new();
    events.extend([long(Button::Up), click(Button::Select)]);
    for _ in 0..13 {
        events.push(click(Button::Down));
    }
    events.extend([click(Button::Up), END]);
    events.extend([click(Button::Down), click(Button::Down), click(Button::Down), END]);
    events.extend([click(Button::Up), click(Button::Up), click(Button::Up), END]);
    events.extend([click(Button::Select), click(Button::Down), click(Button::Select), END]);
    events.extend([click(Button::Back), click(Button::Back), END]);
    let mut app = make_app::<SPLITS_CAPACITY>(&events);

    app.tick(0);
    assert_eq!(app.splits().split_index(), 12);
    assert_eq!(visible_splits(&app), Some((1, 5, 13)));

    app.tick(10);
    assert_eq!(visible_splits(&app), Some((11, 3, 13)));

    app.tick(20);
    assert_eq!(visible_splits(&app), Some((1, 5, 13)));

    app.tick(30);
    assert_eq!(visible_splits(&app), Some((1, 1, 0)));
    assert!(app.splits().is_empty());

    assert_eq!(app.tick(40), TickResult::CloseRequested);
}

#[test]
fn declining_confirmation_keeps_splits() {
    let events = [
        long(Button::Up),
        click(Button::Select),
        click(Button::Down),
        click(Button::Up),
        click(Button::Select),
        click(Button::Select),
        END,
    ];
    let mut app = make_app::<3>(&events);

    app.tick(0);
    assert_eq!(app.splits().len(), 1);
    let mut on_splits = false;
    app.with_screen(|screen| on_splits = matches!(screen, Screen::Splits { .. }));
    assert!(on_splits);
}

#[test]
fn snapshot_during_hold_saves_pre_press_state() {
    let events = [
        long(Button::Up),
        click(Button::Select),
        END,
        click(Button::Select),
        press(Button::Down),
        END,
    ];
    let mut app = make_app::<3>(&events);

    app.tick(0);
    seconds(&mut app, 0, 7);
    app.tick(10);
    assert_eq!(app.time_text(), "HOLD");

    let state = app.snapshot(BASE_UNIX);
    assert_eq!(state.elapsed_secs, 7);
    assert_eq!(state.time_text, " 0:00:07");
    assert_eq!(state.action_label, "Reset");
    assert!(!state.has_been_reset);
}

#[test]
fn save_and_load_round_trip_through_the_app() {
    let events = [
        long(Button::Up),
        click(Button::Select),
        END,
        click(Button::Down),
        END,
    ];
    let mut app = make_app::<3>(&events);
    app.tick(0);
    seconds(&mut app, 0, 42);
    app.tick(10);

    let close_unix = BASE_UNIX + 42;
    let saved = app.snapshot(close_unix);
    let mut store = MemoryRecordStore::new();
    persist::save(&mut store, &saved).unwrap();

    let Restore::Restored(state) = persist::load::<_, 3>(&mut store, close_unix) else {
        panic!("expected a restored state");
    };
    let mut reopened = make_app::<3>(&[]);
    reopened.restore(state);

    assert_eq!(reopened.snapshot(close_unix), saved);
    assert_eq!(reopened.reset_phase(), ResetPhase::Idle);
    assert_eq!(reopened.action_label(), "Split 2");
}

#[test]
fn reopening_after_thirty_seconds_advances_running_chronometer() {
    let events = [long(Button::Up), click(Button::Select), END];
    let mut app = make_app::<3>(&events);
    app.tick(0);
    seconds(&mut app, 0, 100);

    let mut store = MemoryRecordStore::new();
    persist::save(&mut store, &app.snapshot(BASE_UNIX)).unwrap();

    let mut reopened = make_app::<3>(&[]);
    if let Some(state) = persist::load::<_, 3>(&mut store, BASE_UNIX + 30).into_state() {
        reopened.restore(state);
    }

    assert_eq!(reopened.elapsed_secs(), 130);
    assert_eq!(reopened.time_text(), " 0:02:10");
    assert_eq!(reopened.mode(), DisplayMode::Chronometer);
}

#[test]
fn select_is_ignored_on_clock_face() {
    let events = [click(Button::Select), END];
    let mut app = make_app::<3>(&events);

    app.tick(0);
    assert_eq!(app.run_state(), RunState::Stopped);
}

#[test]
fn idle_app_renders_once_then_stays_quiet() {
    let mut app: ChronoApp<_, 3> = ChronoApp::new(MockInput::new(), ChronoConfig::default());

    assert_eq!(app.tick(0), TickResult::RenderRequested);
    assert_eq!(app.tick(10), TickResult::NoRender);
    assert_eq!(app.mode(), DisplayMode::Clock);
    assert_eq!(app.action_label(), "Options");
}

#[test]
fn catch_up_credits_missed_seconds_only_while_running() {
    let events = [long(Button::Up), click(Button::Select), END, click(Button::Select), END];
    let mut app = make_app::<3>(&events);

    app.tick(0);
    seconds(&mut app, 0, 2);
    app.catch_up(3_599);
    app.on_second(CivilTime::from_unix(BASE_UNIX + 3_602));
    assert_eq!(app.elapsed_secs(), 3_602);
    assert_eq!(app.time_text(), " 1:00:02");

    app.tick(10);
    assert_eq!(app.run_state(), RunState::Stopped);
    app.catch_up(600);
    assert_eq!(app.elapsed_secs(), 3_602);
}
