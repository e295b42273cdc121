impl<IN, const N: usize> ChronoApp<IN, N>
where
    IN: InputProvider,
{
    pub fn new(input: IN, config: ChronoConfig) -> Self {
        let options = Options::default();
        let mut app = Self {
            input,
            config,
            ui: UiState::Watch,
            mode: DisplayMode::Clock,
            run: RunState::Stopped,
            elapsed_secs: 0,
            has_been_reset: false,
            time_text: chrono_text(0),
            date_text: DateText::new(),
            action_label: Label::new(),
            splits: SplitsBuffer::new(options.splits_overflow),
            options,
            reset: ResetConfirmation::new(config.reset_hold_ms),
            last_now: None,
            pending_redraw: true,
            close_requested: false,
        };
        app.refresh_action_label();
        app
    }

    /// Fires the reset deadline and drains pending input.
    pub fn tick(&mut self, now_ms: u64) -> TickResult {
        if self.reset.poll(now_ms) {
            self.commit_reset();
        }

        self.process_inputs(now_ms);

        if self.close_requested {
            self.close_requested = false;
            return TickResult::CloseRequested;
        }

        if self.pending_redraw {
            self.pending_redraw = false;
            TickResult::RenderRequested
        } else {
            TickResult::NoRender
        }
    }

    pub fn with_screen<F>(&self, f: F)
    where
        F: FnOnce(Screen<'_>),
    {
        let title = self.config.title;
        let appearance = self.options.appearance;

        match self.ui {
            UiState::Watch => f(Screen::Watch {
                title,
                mode: self.mode,
                run: self.run,
                time: self.time_text.as_str(),
                date: self.date_text.as_str(),
                action_label: self.action_label.as_str(),
                appearance,
            }),
            UiState::Splits => {
                let mut lines = Vec::<SplitLine, SPLITS_PAGE_SIZE>::new();
                for line in self.splits.visible_lines() {
                    if lines.push(line).is_err() {
                        break;
                    }
                }

                f(Screen::Splits {
                    title,
                    lines: &lines,
                    first_number: self.splits.cursor() + 1,
                    total: self.splits.len(),
                    appearance,
                });
            }
            UiState::Options { cursor } => {
                let rows = [
                    OptionRowView {
                        key: "Reset clears",
                        value: OptionValue::Toggle(self.options.reset_clears_splits),
                    },
                    OptionRowView {
                        key: "Overflow",
                        value: OptionValue::Label(self.options.splits_overflow.label()),
                    },
                    OptionRowView {
                        key: "Invert",
                        value: OptionValue::Toggle(appearance.inverted),
                    },
                    OptionRowView {
                        key: "Accent",
                        value: OptionValue::Number(appearance.accent),
                    },
                    OptionRowView {
                        key: "Clear splits",
                        value: OptionValue::Action("Clear"),
                    },
                    OptionRowView {
                        key: "Back",
                        value: OptionValue::Action("Return"),
                    },
                ];

                f(Screen::Options {
                    title,
                    rows: &rows,
                    cursor: (cursor as usize).min(rows.len() - 1),
                    appearance,
                });
            }
            UiState::ConfirmClear { cursor, .. } => f(Screen::ConfirmClear {
                title,
                prompt: CLEAR_SPLITS_PROMPT,
                choices: &CONFIRM_CHOICES,
                cursor: (cursor as usize).min(CONFIRM_CHOICES.len() - 1),
                appearance,
            }),
        }
    }

    /// Everything that survives a close. A hold in progress is treated as
    /// aborted and a committed reset as finalized.
    pub fn snapshot(&self, close_unix: i64) -> PersistedState<N> {
        let mut elapsed_secs = self.elapsed_secs;
        let mut time_text = self.time_text.clone();
        let mut has_been_reset = self.has_been_reset;

        match self.reset.phase() {
            ResetPhase::Idle => {}
            ResetPhase::Holding => {
                if let Some((saved_elapsed, saved_text)) = self.reset.saved() {
                    elapsed_secs = saved_elapsed;
                    if self.mode == DisplayMode::Chronometer {
                        time_text = saved_text.clone();
                    }
                }
            }
            ResetPhase::Committed => has_been_reset = true,
        }

        PersistedState {
            mode: self.mode,
            run: self.run,
            time_text,
            date_text: self.date_text.clone(),
            elapsed_secs,
            close_unix,
            action_label: self.label_for(has_been_reset, ResetPhase::Idle),
            has_been_reset,
            options: self.options,
            splits: Vec::from_slice(self.splits.as_slice()).unwrap_or_default(),
        }
    }

    pub fn restore(&mut self, state: PersistedState<N>) {
        self.mode = state.mode;
        self.run = state.run;
        self.elapsed_secs = state.elapsed_secs;
        self.has_been_reset = state.has_been_reset;
        self.time_text = state.time_text;
        self.date_text = state.date_text;
        self.options = state.options;
        self.splits = SplitsBuffer::from_slice(state.options.splits_overflow, &state.splits);
        self.reset = ResetConfirmation::new(self.config.reset_hold_ms);
        self.ui = UiState::Watch;

        if self.mode == DisplayMode::Chronometer {
            // Picks up time that passed while closed.
            self.time_text = chrono_text(self.elapsed_secs);
            self.date_text.set(CHRONO_DATE_TEXT);
        }

        self.action_label = state.action_label;
        self.refresh_action_label();
        self.pending_redraw = true;
        debug!(
            "chrono: restored mode={:?} run={:?} elapsed={} splits={}",
            self.mode,
            self.run,
            self.elapsed_secs,
            self.splits.len()
        );
    }

    pub fn config(&self) -> ChronoConfig {
        self.config
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn run_state(&self) -> RunState {
        self.run
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn has_been_reset(&self) -> bool {
        self.has_been_reset
    }

    pub fn time_text(&self) -> &str {
        self.time_text.as_str()
    }

    pub fn date_text(&self) -> &str {
        self.date_text.as_str()
    }

    pub fn action_label(&self) -> &str {
        self.action_label.as_str()
    }

    pub fn splits(&self) -> &SplitsBuffer<N> {
        &self.splits
    }

    pub fn options(&self) -> Options {
        self.options
    }

    pub fn reset_phase(&self) -> ResetPhase {
        self.reset.phase()
    }

    /// Drops a reset hold without committing it, as on power-down.
    pub fn abandon_reset(&mut self) {
        if let Some((saved_elapsed, saved_text)) = self.reset.saved() {
            self.elapsed_secs = saved_elapsed;
            if self.mode == DisplayMode::Chronometer {
                self.time_text = saved_text.clone();
            }
        } else if self.reset.phase() == ResetPhase::Committed {
            self.has_been_reset = true;
        }
        self.reset.abandon();
        self.refresh_action_label();
    }
}
