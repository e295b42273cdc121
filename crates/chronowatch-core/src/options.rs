//! User options that gate reset and splits behavior.

use serde::{Deserialize, Serialize};

/// Number of accent palette slots the display layer understands.
pub const ACCENT_COUNT: u8 = 4;

/// What a full splits buffer does with a new split.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum OverflowPolicy {
    /// Discard the new split.
    #[default]
    KeepOldest,
    /// Drop the oldest split and append the new one.
    KeepLatest,
}

impl OverflowPolicy {
    pub const fn toggled(self) -> Self {
        match self {
            Self::KeepOldest => Self::KeepLatest,
            Self::KeepLatest => Self::KeepOldest,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::KeepOldest => "Keep oldest",
            Self::KeepLatest => "Keep latest",
        }
    }
}

/// Presentation choices. Opaque to the core; stored so they survive restarts.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    pub inverted: bool,
    pub accent: u8,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Options {
    pub reset_clears_splits: bool,
    pub splits_overflow: OverflowPolicy,
    pub appearance: Appearance,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            reset_clears_splits: true,
            splits_overflow: OverflowPolicy::KeepOldest,
            appearance: Appearance::default(),
        }
    }
}

impl Options {
    pub fn set_reset_clears_splits(&mut self, enabled: bool) {
        self.reset_clears_splits = enabled;
    }

    pub fn set_splits_overflow(&mut self, policy: OverflowPolicy) {
        self.splits_overflow = policy;
    }

    pub fn toggle_inverted(&mut self) {
        self.appearance.inverted = !self.appearance.inverted;
    }

    pub fn cycle_accent(&mut self) {
        self.appearance.accent = (self.appearance.accent % ACCENT_COUNT + 1) % ACCENT_COUNT;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_clear_splits_on_reset_and_keep_oldest() {
        let options = Options::default();
        assert!(options.reset_clears_splits);
        assert_eq!(options.splits_overflow, OverflowPolicy::KeepOldest);
        assert!(!options.appearance.inverted);
    }

    #[test]
    fn accent_wraps_around_palette() {
        let mut options = Options::default();
        for _ in 0..ACCENT_COUNT {
            options.cycle_accent();
        }
        assert_eq!(options.appearance.accent, 0);
    }
}
