impl<IN, const N: usize> ChronoApp<IN, N>
where
    IN: InputProvider,
{
    /// Once-per-second timebase step. The chronometer advances in the
    /// background whatever face is shown.
    pub fn on_second(&mut self, now: CivilTime) -> TickResult {
        if self.run == RunState::Running {
            self.elapsed_secs = self.elapsed_secs.wrapping_add(1);
        }
        self.last_now = Some(now);

        match self.mode {
            DisplayMode::Chronometer => {
                if self.reset.in_progress() {
                    return TickResult::NoRender;
                }
                self.time_text = chrono_text(self.elapsed_secs);
            }
            DisplayMode::Clock => self.refresh_clock_text(&now),
        }

        if self.ui == UiState::Watch {
            TickResult::RenderRequested
        } else {
            TickResult::NoRender
        }
    }

    /// Credits seconds that passed without an `on_second` call, e.g. after a
    /// stalled loop. The readout catches up on the next `on_second`.
    pub fn catch_up(&mut self, missed_secs: u32) {
        if self.run == RunState::Running {
            self.elapsed_secs = self.elapsed_secs.wrapping_add(missed_secs);
        }
    }

    fn refresh_clock_text(&mut self, now: &CivilTime) {
        self.time_text = clock_text(now, self.config.clock_24h);
        self.date_text = date_text(now);
    }

    fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();

        match self.mode {
            DisplayMode::Chronometer => {
                self.date_text.set(CHRONO_DATE_TEXT);
                if self.reset.in_progress() {
                    self.time_text.set(HOLD_TEXT);
                } else {
                    self.time_text = chrono_text(self.elapsed_secs);
                }
            }
            DisplayMode::Clock => {
                if let Some(now) = self.last_now {
                    self.refresh_clock_text(&now);
                }
            }
        }

        self.refresh_action_label();
        self.pending_redraw = true;
        debug!("chrono: mode -> {:?}", self.mode);
    }

    fn toggle_run(&mut self) {
        if self.mode != DisplayMode::Chronometer {
            return;
        }
        if self.reset.phase() != ResetPhase::Idle {
            debug!("chrono: run toggle ignored during reset");
            return;
        }

        self.run = self.run.toggled();
        if self.run == RunState::Stopped {
            self.has_been_reset = false;
        }

        self.refresh_action_label();
        self.pending_redraw = true;
        debug!(
            "chrono: run -> {:?} elapsed={}",
            self.run, self.elapsed_secs
        );
    }

    fn record_split(&mut self) {
        if self.mode != DisplayMode::Chronometer || self.run != RunState::Running {
            return;
        }

        let outcome = self.splits.append(self.elapsed_secs);
        if outcome != AppendOutcome::Discarded {
            self.pending_redraw = true;
        }
        self.refresh_action_label();
        debug!(
            "splits: {:?} elapsed={} index={}",
            outcome,
            self.elapsed_secs,
            self.splits.split_index()
        );
    }

    fn press_reset(&mut self, now_ms: u64) {
        if self.mode != DisplayMode::Chronometer
            || self.run != RunState::Stopped
            || self.has_been_reset
        {
            return;
        }

        if self.reset.press(now_ms, self.elapsed_secs, &self.time_text) {
            self.time_text.set(HOLD_TEXT);
            self.pending_redraw = true;
        }
    }

    fn commit_reset(&mut self) {
        self.elapsed_secs = 0;
        if self.mode == DisplayMode::Chronometer {
            self.time_text = chrono_text(0);
        }
        if self.options.reset_clears_splits {
            self.splits.clear();
        }
        self.refresh_action_label();
        self.pending_redraw = true;
        debug!(
            "chrono: reset committed splits_cleared={}",
            self.options.reset_clears_splits
        );
    }

    fn release_reset(&mut self) {
        match self.reset.release() {
            ReleaseOutcome::Ignored => return,
            ReleaseOutcome::Aborted { elapsed_secs, text } => {
                self.elapsed_secs = elapsed_secs;
                if self.mode == DisplayMode::Chronometer {
                    self.time_text = text;
                }
            }
            ReleaseOutcome::Finalized => {
                self.has_been_reset = true;
            }
        }

        self.refresh_action_label();
        self.pending_redraw = true;
    }

    fn clear_splits(&mut self) {
        self.splits.clear();
        self.refresh_action_label();
        debug!("splits: cleared");
    }

    fn activate_option(&mut self, row: OptionsRow) {
        match row {
            OptionsRow::ResetClearsSplits => {
                let enabled = !self.options.reset_clears_splits;
                self.options.set_reset_clears_splits(enabled);
            }
            OptionsRow::SplitsOverflow => {
                let policy = self.options.splits_overflow.toggled();
                self.options.set_splits_overflow(policy);
                self.splits.set_overflow(policy);
                self.refresh_action_label();
            }
            OptionsRow::Invert => self.options.toggle_inverted(),
            OptionsRow::Accent => self.options.cycle_accent(),
            OptionsRow::ClearSplits | OptionsRow::Back => {}
        }
        debug!("chrono: option {:?} -> {:?}", row, self.options);
    }

    fn refresh_action_label(&mut self) {
        self.action_label = self.label_for(self.has_been_reset, self.reset.phase());
    }

    fn label_for(&self, has_been_reset: bool, phase: ResetPhase) -> Label {
        match (self.mode, self.run) {
            (DisplayMode::Clock, _) => Label::from_str_truncated(OPTIONS_LABEL),
            (DisplayMode::Chronometer, RunState::Running) => {
                match (self.splits.next_slot_number(), self.splits.overflow()) {
                    (Some(slot), _) => Label::from_fmt(format_args!("Split {}", slot)),
                    (None, OverflowPolicy::KeepOldest) => {
                        Label::from_str_truncated(SPLIT_FULL_LABEL)
                    }
                    (None, OverflowPolicy::KeepLatest) => {
                        Label::from_fmt(format_args!("Split {}", N))
                    }
                }
            }
            (DisplayMode::Chronometer, RunState::Stopped) => match phase {
                ResetPhase::Committed => Label::new(),
                ResetPhase::Idle | ResetPhase::Holding if has_been_reset => Label::new(),
                ResetPhase::Idle | ResetPhase::Holding => {
                    Label::from_str_truncated(RESET_LABEL)
                }
            },
        }
    }
}
