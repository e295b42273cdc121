//! App-level view models consumed by the display sink.

use crate::{
    app::{DisplayMode, RunState},
    options::Appearance,
    splits::SplitLine,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OptionValue<'a> {
    Label(&'a str),
    Toggle(bool),
    Number(u8),
    Action(&'a str),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OptionRowView<'a> {
    pub key: &'a str,
    pub value: OptionValue<'a>,
}

/// Answers offered on the clear-splits confirmation, in cursor order.
pub const CONFIRM_CHOICES: [&str; 2] = ["No", "Yes"];

/// App-level view model consumed by the board renderer.
#[derive(Debug)]
pub enum Screen<'a> {
    Watch {
        title: &'a str,
        mode: DisplayMode,
        run: RunState,
        time: &'a str,
        date: &'a str,
        action_label: &'a str,
        appearance: Appearance,
    },
    Splits {
        title: &'a str,
        lines: &'a [SplitLine],
        /// One-based number of the first visible line.
        first_number: usize,
        total: usize,
        appearance: Appearance,
    },
    Options {
        title: &'a str,
        rows: &'a [OptionRowView<'a>],
        cursor: usize,
        appearance: Appearance,
    },
    ConfirmClear {
        title: &'a str,
        prompt: &'a str,
        choices: &'a [&'a str],
        cursor: usize,
        appearance: Appearance,
    },
}
