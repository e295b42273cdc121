//! Application state machine for the watch face, splits and options.

use heapless::Vec;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    input::{Button, ButtonEvent, Gesture, InputProvider},
    options::{Options, OverflowPolicy},
    persist::PersistedState,
    render::{CONFIRM_CHOICES, OptionRowView, OptionValue, Screen},
    reset::{HOLD_TEXT, RESET_HOLD_MS, ReleaseOutcome, ResetConfirmation, ResetPhase},
    splits::{AppendOutcome, PageDirection, SPLITS_PAGE_SIZE, SplitLine, SplitsBuffer},
    text::{DateText, Label, TimeText},
    timebase::{CivilTime, chrono_text, clock_text, date_text},
};

const CHRONO_DATE_TEXT: &str = "CHRONO";
const OPTIONS_LABEL: &str = "Options";
const RESET_LABEL: &str = "Reset";
const SPLIT_FULL_LABEL: &str = "Split Full";
const CLEAR_SPLITS_PROMPT: &str = "Clear splits?";
/// Index of "Yes" in [`CONFIRM_CHOICES`].
const CONFIRM_YES_CURSOR: u8 = 1;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickResult {
    NoRender,
    RenderRequested,
    /// The user asked to leave the app; persist and power down.
    CloseRequested,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChronoConfig {
    pub clock_24h: bool,
    pub reset_hold_ms: u32,
    pub title: &'static str,
}

impl Default for ChronoConfig {
    fn default() -> Self {
        Self {
            clock_24h: false,
            reset_hold_ms: RESET_HOLD_MS,
            title: "Chronowatch",
        }
    }
}

impl ChronoConfig {
    pub const fn with_clock_24h(mut self, clock_24h: bool) -> Self {
        self.clock_24h = clock_24h;
        self
    }

    pub const fn with_reset_hold_ms(mut self, reset_hold_ms: u32) -> Self {
        self.reset_hold_ms = reset_hold_ms;
        self
    }

    pub const fn with_title(mut self, title: &'static str) -> Self {
        self.title = title;
        self
    }
}

/// Which face the watch screen shows.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum DisplayMode {
    #[default]
    Clock,
    Chronometer,
}

impl DisplayMode {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Clock => Self::Chronometer,
            Self::Chronometer => Self::Clock,
        }
    }
}

/// Chronometer run state. Kept across mode switches.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum RunState {
    #[default]
    Stopped,
    Running,
}

impl RunState {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Stopped => Self::Running,
            Self::Running => Self::Stopped,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum UiState {
    Watch,
    Splits,
    Options { cursor: u8 },
    ConfirmClear { cursor: u8, from_splits: bool },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum OptionsRow {
    ResetClearsSplits,
    SplitsOverflow,
    Invert,
    Accent,
    ClearSplits,
    Back,
}

impl OptionsRow {
    const COUNT: u8 = 6;

    fn from_index(index: u8) -> Self {
        match index {
            0 => Self::ResetClearsSplits,
            1 => Self::SplitsOverflow,
            2 => Self::Invert,
            3 => Self::Accent,
            4 => Self::ClearSplits,
            _ => Self::Back,
        }
    }

    const fn index(self) -> u8 {
        self as u8
    }
}

pub struct ChronoApp<IN, const N: usize>
where
    IN: InputProvider,
{
    input: IN,
    config: ChronoConfig,
    ui: UiState,
    mode: DisplayMode,
    run: RunState,
    elapsed_secs: u32,
    has_been_reset: bool,
    time_text: TimeText,
    date_text: DateText,
    action_label: Label,
    splits: SplitsBuffer<N>,
    options: Options,
    reset: ResetConfirmation,
    last_now: Option<CivilTime>,
    pending_redraw: bool,
    close_requested: bool,
}

include!("view.rs");
include!("input.rs");
include!("runtime.rs");

fn rotate_down(current: u8, total: u8) -> u8 {
    if total == 0 { 0 } else { (current + 1) % total }
}

fn rotate_up(current: u8, total: u8) -> u8 {
    if total == 0 {
        0
    } else if current == 0 {
        total - 1
    } else {
        current - 1
    }
}

#[cfg(test)]
mod tests;
