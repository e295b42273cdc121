//! Fixed-capacity text values for labels and formatted readouts.
//!
//! Every string the core hands to the display has a hard byte budget. Writes
//! past the budget keep the longest whole-character prefix that fits and
//! report the cut to the caller; they never fail and never split a UTF-8
//! sequence.

use core::fmt;

use heapless::String;
use serde::{Deserialize, Serialize};

/// Clock or chronometer readout, e.g. `" 0:00:00"` or `"HOLD"`.
pub const TIME_TEXT_BYTES: usize = 8;
/// Date line under the readout, e.g. `"Wed Sep 30"` or `"CHRONO"`.
pub const DATE_TEXT_BYTES: usize = 10;
/// Action button caption, e.g. `"Split 12"` or `"Split Full"`.
pub const LABEL_BYTES: usize = 10;

pub type TimeText = BoundedText<TIME_TEXT_BYTES>;
pub type DateText = BoundedText<DATE_TEXT_BYTES>;
pub type Label = BoundedText<LABEL_BYTES>;

/// Text that never grows past `N` bytes.
#[derive(Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundedText<const N: usize>(String<N>);

impl<const N: usize> BoundedText<N> {
    pub const CAPACITY: usize = N;

    pub const fn new() -> Self {
        Self(String::new())
    }

    /// Builds a value from `source`, keeping the longest prefix that fits.
    pub fn from_str_truncated(source: &str) -> Self {
        let mut out = Self::new();
        out.push_str_truncated(source);
        out
    }

    /// Renders `args` into a fresh value with the same truncation contract.
    pub fn from_fmt(args: fmt::Arguments<'_>) -> Self {
        let mut out = Self::new();
        // `write_str` below never reports an error; overflow is truncation.
        let _ = fmt::write(&mut out, args);
        out
    }

    /// Replaces the contents. Returns `false` when `source` had to be cut.
    pub fn set(&mut self, source: &str) -> bool {
        self.0.clear();
        self.push_str_truncated(source)
    }

    /// Appends as much of `source` as fits. Returns `false` when cut.
    pub fn push_str_truncated(&mut self, source: &str) -> bool {
        for ch in source.chars() {
            if self.0.push(ch).is_err() {
                return false;
            }
        }
        true
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<const N: usize> fmt::Write for BoundedText<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str_truncated(s);
        Ok(())
    }
}

impl<const N: usize> fmt::Display for BoundedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<const N: usize> fmt::Debug for BoundedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl<const N: usize> PartialEq<str> for BoundedText<N> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl<const N: usize> PartialEq<&str> for BoundedText<N> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}
