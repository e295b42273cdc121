//! Fixed-capacity splits store with overflow policy and page cursor.

use heapless::Vec;
use log::debug;

use crate::{options::OverflowPolicy, text::BoundedText, timebase::chrono_text};

/// Splits kept by the current firmware.
pub const SPLITS_CAPACITY: usize = 98;
/// Splits kept by the first release, before the store was sharded.
pub const LEGACY_SPLITS_CAPACITY: usize = 29;
/// Entries advanced per scroll command in the splits view.
pub const SPLITS_PAGE_SIZE: usize = 5;
/// `"12) 10:04:59"`
pub const SPLIT_LINE_BYTES: usize = 12;

const NO_SPLITS_TEXT: &str = "None";

pub type SplitLine = BoundedText<SPLIT_LINE_BYTES>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AppendOutcome {
    Stored,
    /// Buffer was full; the oldest split was dropped.
    Replaced,
    /// Buffer was full; the new split was dropped.
    Discarded,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PageDirection {
    Forward,
    Backward,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SplitsBuffer<const N: usize> {
    slots: Vec<u32, N>,
    overflow: OverflowPolicy,
    cursor: usize,
}

impl<const N: usize> SplitsBuffer<N> {
    pub const fn new(overflow: OverflowPolicy) -> Self {
        Self {
            slots: Vec::new(),
            overflow,
            cursor: 0,
        }
    }

    /// Rebuilds a buffer from stored values, keeping at most the first `N`.
    pub fn from_slice(overflow: OverflowPolicy, values: &[u32]) -> Self {
        let mut buffer = Self::new(overflow);
        for value in values.iter().take(N) {
            // Bounded by `take(N)`.
            let _ = buffer.slots.push(*value);
        }
        buffer
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= N
    }

    /// Zero-based index of the newest split, `-1` when none are recorded.
    pub fn split_index(&self) -> i16 {
        self.slots.len() as i16 - 1
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.slots
    }

    pub fn overflow(&self) -> OverflowPolicy {
        self.overflow
    }

    pub fn set_overflow(&mut self, overflow: OverflowPolicy) {
        self.overflow = overflow;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// One-based number of the slot the next split will fill.
    pub fn next_slot_number(&self) -> Option<usize> {
        if self.is_full() {
            None
        } else {
            Some(self.slots.len() + 1)
        }
    }

    pub fn append(&mut self, elapsed_secs: u32) -> AppendOutcome {
        if !self.is_full() {
            // Not full, so there is room.
            let _ = self.slots.push(elapsed_secs);
            return AppendOutcome::Stored;
        }

        match self.overflow {
            OverflowPolicy::KeepOldest => {
                debug!("splits: full, discarding elapsed={}", elapsed_secs);
                AppendOutcome::Discarded
            }
            OverflowPolicy::KeepLatest => {
                if self.slots.is_empty() {
                    return AppendOutcome::Discarded;
                }
                self.slots.rotate_left(1);
                if let Some(last) = self.slots.last_mut() {
                    *last = elapsed_secs;
                }
                AppendOutcome::Replaced
            }
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.cursor = 0;
    }

    /// Moves the view by one page. Returns `false` when already at an edge.
    pub fn page(&mut self, direction: PageDirection) -> bool {
        match direction {
            PageDirection::Forward => {
                let next = self.cursor + SPLITS_PAGE_SIZE;
                if next >= self.slots.len() {
                    return false;
                }
                self.cursor = next;
            }
            PageDirection::Backward => {
                if self.cursor < SPLITS_PAGE_SIZE {
                    return false;
                }
                self.cursor -= SPLITS_PAGE_SIZE;
            }
        }
        true
    }

    /// Fixed-width line for the split at zero-based `index`.
    pub fn line(&self, index: usize) -> Option<SplitLine> {
        self.slots
            .get(index)
            .map(|elapsed| split_line(index, *elapsed))
    }

    /// Every recorded split as a display line, or one placeholder line.
    pub fn lines(&self) -> impl Iterator<Item = SplitLine> + '_ {
        let placeholder = self.is_empty().then(no_splits_line);
        placeholder.into_iter().chain(
            self.slots
                .iter()
                .enumerate()
                .map(|(index, elapsed)| split_line(index, *elapsed)),
        )
    }

    /// The page of lines under the cursor.
    pub fn visible_lines(&self) -> impl Iterator<Item = SplitLine> + '_ {
        self.lines().skip(self.cursor).take(SPLITS_PAGE_SIZE)
    }
}

fn split_line(index: usize, elapsed_secs: u32) -> SplitLine {
    SplitLine::from_fmt(format_args!("{:>2}) {}", index + 1, chrono_text(elapsed_secs)))
}

fn no_splits_line() -> SplitLine {
    SplitLine::from_fmt(format_args!(
        "{:^width$}",
        NO_SPLITS_TEXT,
        width = SPLIT_LINE_BYTES
    ))
}
