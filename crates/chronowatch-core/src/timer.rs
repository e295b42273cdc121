//! Cancellable one-shot timer driven by the app tick.

use log::debug;

/// Identifies one scheduling of a [`OneShot`]. Rescheduling invalidates
/// every earlier handle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimerHandle {
    generation: u32,
}

/// A single pending deadline. At most one is in flight at a time.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct OneShot {
    generation: u32,
    due_ms: Option<u64>,
}

impl OneShot {
    pub const fn new() -> Self {
        Self {
            generation: 0,
            due_ms: None,
        }
    }

    /// Arms the timer `delay_ms` after `now_ms`, replacing any pending one.
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u32) -> TimerHandle {
        if self.due_ms.is_some() {
            debug!("timer: replacing pending generation={}", self.generation);
        }
        self.generation = self.generation.wrapping_add(1);
        self.due_ms = Some(now_ms.saturating_add(delay_ms as u64));
        TimerHandle {
            generation: self.generation,
        }
    }

    /// Disarms the timer if `handle` is the pending one.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        if self.due_ms.is_some() && handle.generation == self.generation {
            self.due_ms = None;
            true
        } else {
            false
        }
    }

    /// Disarms the timer unconditionally.
    pub fn cancel_any(&mut self) {
        self.due_ms = None;
    }

    pub fn is_pending(&self) -> bool {
        self.due_ms.is_some()
    }

    pub fn due_ms(&self) -> Option<u64> {
        self.due_ms
    }

    /// Fires the timer once its deadline has passed.
    pub fn fire_due(&mut self, now_ms: u64) -> Option<TimerHandle> {
        let due = self.due_ms?;
        if now_ms < due {
            return None;
        }
        self.due_ms = None;
        Some(TimerHandle {
            generation: self.generation,
        })
    }
}
