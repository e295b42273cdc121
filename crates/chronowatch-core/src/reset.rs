//! Press-and-hold confirmation guarding the chronometer reset.
//!
//! A press arms a one-shot timer. If the button is still down when it fires
//! the reset commits; releasing earlier aborts and hands back the snapshot
//! taken at press time. The release after a commit finalizes the session.

use log::debug;

use crate::{
    text::TimeText,
    timer::{OneShot, TimerHandle},
};

/// How long the reset button must be held before the reset commits.
pub const RESET_HOLD_MS: u32 = 1_000;
/// Readout shown in place of the time while the button is held.
pub const HOLD_TEXT: &str = "HOLD";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResetPhase {
    Idle,
    Holding,
    Committed,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReleaseOutcome {
    /// No press was being tracked.
    Ignored,
    /// Released before the deadline; the snapshot must be put back.
    Aborted { elapsed_secs: u32, text: TimeText },
    /// Released after the commit.
    Finalized,
}

#[derive(Clone, Debug)]
pub struct ResetConfirmation {
    hold_ms: u32,
    phase: ResetPhase,
    saved_elapsed: u32,
    saved_text: TimeText,
    timer: OneShot,
    pending: Option<TimerHandle>,
}

impl ResetConfirmation {
    pub const fn new(hold_ms: u32) -> Self {
        Self {
            hold_ms,
            phase: ResetPhase::Idle,
            saved_elapsed: 0,
            saved_text: TimeText::new(),
            timer: OneShot::new(),
            pending: None,
        }
    }

    pub fn phase(&self) -> ResetPhase {
        self.phase
    }

    pub fn in_progress(&self) -> bool {
        self.phase == ResetPhase::Holding
    }

    /// Snapshot taken at press time, while the hold is in progress.
    pub fn saved(&self) -> Option<(u32, &TimeText)> {
        match self.phase {
            ResetPhase::Holding => Some((self.saved_elapsed, &self.saved_text)),
            _ => None,
        }
    }

    /// Starts a hold. Ignored unless idle, so only one timer is ever armed.
    pub fn press(&mut self, now_ms: u64, elapsed_secs: u32, shown: &TimeText) -> bool {
        if self.phase != ResetPhase::Idle {
            debug!("reset: press ignored in phase={:?}", self.phase);
            return false;
        }

        self.saved_elapsed = elapsed_secs;
        self.saved_text = shown.clone();
        self.pending = Some(self.timer.schedule(now_ms, self.hold_ms));
        self.phase = ResetPhase::Holding;
        debug!(
            "reset: hold started elapsed={} deadline_ms={:?}",
            elapsed_secs,
            self.timer.due_ms()
        );
        true
    }

    /// Returns `true` exactly once, when the hold deadline passes.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if self.phase != ResetPhase::Holding {
            return false;
        }

        match self.timer.fire_due(now_ms) {
            Some(fired) if Some(fired) == self.pending => {
                self.pending = None;
                self.phase = ResetPhase::Committed;
                debug!("reset: hold confirmed at now_ms={}", now_ms);
                true
            }
            _ => false,
        }
    }

    pub fn release(&mut self) -> ReleaseOutcome {
        match self.phase {
            ResetPhase::Idle => ReleaseOutcome::Ignored,
            ResetPhase::Committed => {
                self.phase = ResetPhase::Idle;
                debug!("reset: finalized on release");
                ReleaseOutcome::Finalized
            }
            ResetPhase::Holding => {
                if let Some(handle) = self.pending.take() {
                    self.timer.cancel(handle);
                }
                self.phase = ResetPhase::Idle;
                debug!("reset: aborted, restoring elapsed={}", self.saved_elapsed);
                ReleaseOutcome::Aborted {
                    elapsed_secs: self.saved_elapsed,
                    text: self.saved_text.clone(),
                }
            }
        }
    }

    /// Drops any session without reporting an outcome (app close).
    pub fn abandon(&mut self) {
        self.timer.cancel_any();
        self.pending = None;
        self.phase = ResetPhase::Idle;
    }
}

impl Default for ResetConfirmation {
    fn default() -> Self {
        Self::new(RESET_HOLD_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shown() -> TimeText {
        TimeText::from_str_truncated(" 0:01:40")
    }

    #[test]
    fn early_release_aborts_with_snapshot() {
        let mut reset = ResetConfirmation::default();
        assert!(reset.press(0, 100, &shown()));
        assert!(!reset.poll(999));

        assert_eq!(
            reset.release(),
            ReleaseOutcome::Aborted {
                elapsed_secs: 100,
                text: shown()
            }
        );
        assert_eq!(reset.phase(), ResetPhase::Idle);
        // The cancelled deadline must not fire later.
        assert!(!reset.poll(5_000));
    }

    #[test]
    fn hold_past_deadline_commits_then_release_finalizes() {
        let mut reset = ResetConfirmation::default();
        reset.press(10, 42, &shown());

        assert!(reset.poll(1_010));
        assert!(!reset.poll(1_011));
        assert_eq!(reset.phase(), ResetPhase::Committed);
        assert_eq!(reset.release(), ReleaseOutcome::Finalized);
        assert_eq!(reset.release(), ReleaseOutcome::Ignored);
    }

    #[test]
    fn second_press_while_holding_is_ignored() {
        let mut reset = ResetConfirmation::default();
        assert!(reset.press(0, 1, &shown()));
        assert!(!reset.press(500, 2, &shown()));
        assert_eq!(reset.saved().map(|(elapsed, _)| elapsed), Some(1));
        // Deadline is still the first one.
        assert!(reset.poll(1_000));
    }
}
