impl<IN, const N: usize> ChronoApp<IN, N>
where
    IN: InputProvider,
{
    fn process_inputs(&mut self, now_ms: u64) {
        loop {
            match self.input.poll_event() {
                Ok(Some(event)) => self.apply_input_event(event, now_ms),
                Ok(None) => break,
                Err(_) => {
                    log::warn!("chrono: input provider error, dropping this poll");
                    break;
                }
            }
        }
    }

    fn apply_input_event(&mut self, event: ButtonEvent, now_ms: u64) {
        // A release always closes the reset session its press opened.
        if event == ButtonEvent::released(Button::Down) && self.reset.phase() != ResetPhase::Idle {
            self.release_reset();
            return;
        }

        match self.ui {
            UiState::Watch => self.apply_watch_input(event, now_ms),
            UiState::Splits => self.apply_splits_input(event),
            UiState::Options { cursor } => self.apply_options_input(cursor, event),
            UiState::ConfirmClear {
                cursor,
                from_splits,
            } => self.apply_confirm_input(cursor, from_splits, event),
        }
    }

    fn apply_watch_input(&mut self, event: ButtonEvent, now_ms: u64) {
        match (event.button, event.gesture) {
            (Button::Up, Gesture::LongPress) => self.toggle_mode(),
            (Button::Up, Gesture::Click) => {
                if self.mode == DisplayMode::Chronometer {
                    self.enter_splits();
                }
            }
            (Button::Select, Gesture::Click) => self.toggle_run(),
            (Button::Down, Gesture::Click) => match (self.mode, self.run) {
                (DisplayMode::Chronometer, RunState::Running) => self.record_split(),
                (DisplayMode::Clock, _) => self.enter_options(0),
                (DisplayMode::Chronometer, RunState::Stopped) => {}
            },
            (Button::Down, Gesture::Pressed) => self.press_reset(now_ms),
            (Button::Back, Gesture::Click) => {
                debug!("chrono: close requested");
                self.close_requested = true;
            }
            _ => {}
        }
    }

    fn apply_splits_input(&mut self, event: ButtonEvent) {
        if event.gesture != Gesture::Click {
            return;
        }

        match event.button {
            Button::Up => {
                if self.splits.page(PageDirection::Backward) {
                    self.pending_redraw = true;
                }
            }
            Button::Down => {
                if self.splits.page(PageDirection::Forward) {
                    self.pending_redraw = true;
                }
            }
            Button::Select => self.enter_confirm_clear(true),
            Button::Back => self.enter_watch(),
        }
    }

    fn apply_options_input(&mut self, cursor: u8, event: ButtonEvent) {
        if event.gesture != Gesture::Click {
            return;
        }

        match event.button {
            Button::Up => self.enter_options(rotate_up(cursor, OptionsRow::COUNT)),
            Button::Down => self.enter_options(rotate_down(cursor, OptionsRow::COUNT)),
            Button::Back => self.enter_watch(),
            Button::Select => match OptionsRow::from_index(cursor) {
                OptionsRow::ClearSplits => self.enter_confirm_clear(false),
                OptionsRow::Back => self.enter_watch(),
                row => {
                    self.activate_option(row);
                    self.pending_redraw = true;
                }
            },
        }
    }

    fn apply_confirm_input(&mut self, cursor: u8, from_splits: bool, event: ButtonEvent) {
        if event.gesture != Gesture::Click {
            return;
        }

        let total = CONFIRM_CHOICES.len() as u8;
        match event.button {
            Button::Up => {
                self.ui = UiState::ConfirmClear {
                    cursor: rotate_up(cursor, total),
                    from_splits,
                };
                self.pending_redraw = true;
            }
            Button::Down => {
                self.ui = UiState::ConfirmClear {
                    cursor: rotate_down(cursor, total),
                    from_splits,
                };
                self.pending_redraw = true;
            }
            Button::Select => {
                if cursor == CONFIRM_YES_CURSOR {
                    self.clear_splits();
                }
                self.leave_confirm_clear(from_splits);
            }
            Button::Back => self.leave_confirm_clear(from_splits),
        }
    }

    fn enter_watch(&mut self) {
        self.ui = UiState::Watch;
        self.pending_redraw = true;
    }

    fn enter_splits(&mut self) {
        self.ui = UiState::Splits;
        self.pending_redraw = true;
    }

    fn enter_options(&mut self, cursor: u8) {
        self.ui = UiState::Options { cursor };
        self.pending_redraw = true;
    }

    fn enter_confirm_clear(&mut self, from_splits: bool) {
        self.ui = UiState::ConfirmClear {
            cursor: 0,
            from_splits,
        };
        self.pending_redraw = true;
    }

    fn leave_confirm_clear(&mut self, from_splits: bool) {
        if from_splits {
            self.enter_splits();
        } else {
            self.enter_options(OptionsRow::ClearSplits.index());
        }
    }
}
