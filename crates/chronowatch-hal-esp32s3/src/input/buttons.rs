use embedded_hal::digital::InputPin;
use heapless::Deque;
use log::warn;

use chronowatch_core::input::{Button, ButtonEvent, InputProvider};

const BUTTON_ORDER: [Button; 4] = [Button::Back, Button::Up, Button::Select, Button::Down];
const PENDING_EVENTS: usize = 16;

#[derive(Debug, Clone, Copy)]
pub struct ButtonConfig {
    active_low: bool,
    debounce_polls: u8,
    long_press_polls: u16,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            active_low: true,
            debounce_polls: 3,
            long_press_polls: 500,
        }
    }
}

impl ButtonConfig {
    pub const fn with_active_low(mut self, active_low: bool) -> Self {
        self.active_low = active_low;
        self
    }

    pub const fn with_debounce_polls(mut self, debounce_polls: u8) -> Self {
        self.debounce_polls = debounce_polls;
        self
    }

    /// Polls a button must stay down before it reports a long press.
    pub const fn with_long_press_polls(mut self, long_press_polls: u16) -> Self {
        self.long_press_polls = long_press_polls;
        self
    }
}

#[derive(Debug)]
pub enum ButtonInputError<E> {
    Pin { button: Button, error: E },
}

#[derive(Debug, Default, Clone, Copy)]
struct ButtonState {
    raw: bool,
    stable: bool,
    stable_count: u8,
    held_polls: u16,
    long_fired: bool,
}

/// Four debounced push buttons turned into press, release, click and
/// long-press gestures.
#[derive(Debug)]
pub struct ButtonInput<P> {
    pins: [P; 4],
    config: ButtonConfig,
    states: [ButtonState; 4],
    pending: Deque<ButtonEvent, PENDING_EVENTS>,
}

impl<P> ButtonInput<P>
where
    P: InputPin,
{
    /// Pins are given in `Back, Up, Select, Down` order.
    pub fn new(
        mut pins: [P; 4],
        config: ButtonConfig,
    ) -> Result<Self, ButtonInputError<P::Error>> {
        let mut states = [ButtonState::default(); 4];
        for (index, pin) in pins.iter_mut().enumerate() {
            let high = pin.is_high().map_err(|error| ButtonInputError::Pin {
                button: BUTTON_ORDER[index],
                error,
            })?;
            let pressed = pressed_from_level(high, config.active_low);
            states[index].raw = pressed;
            states[index].stable = pressed;
            // A button held through boot must not fire a long press.
            states[index].long_fired = pressed;
        }

        Ok(Self {
            pins,
            config,
            states,
            pending: Deque::new(),
        })
    }

    fn poll_button(&mut self, index: usize) -> Result<(), ButtonInputError<P::Error>> {
        let button = BUTTON_ORDER[index];
        let high = self.pins[index]
            .is_high()
            .map_err(|error| ButtonInputError::Pin { button, error })?;
        let pressed = pressed_from_level(high, self.config.active_low);

        let debounce_threshold = self.config.debounce_polls.max(1);
        let long_press_threshold = self.config.long_press_polls.max(1);
        let state = &mut self.states[index];

        if pressed == state.raw {
            state.stable_count = state.stable_count.saturating_add(1);
        } else {
            state.raw = pressed;
            state.stable_count = 0;
        }

        if state.stable_count >= debounce_threshold && state.stable != state.raw {
            state.stable = state.raw;
            if state.stable {
                state.held_polls = 0;
                state.long_fired = false;
                self.push(ButtonEvent::pressed(button));
            } else {
                let click = !state.long_fired;
                self.push(ButtonEvent::released(button));
                if click {
                    self.push(ButtonEvent::click(button));
                }
            }
            return Ok(());
        }

        if state.stable && !state.long_fired {
            state.held_polls = state.held_polls.saturating_add(1);
            if state.held_polls >= long_press_threshold {
                state.long_fired = true;
                self.push(ButtonEvent::long_press(button));
            }
        }

        Ok(())
    }

    fn push(&mut self, event: ButtonEvent) {
        if self.pending.push_back(event).is_err() {
            warn!("buttons: event queue full, dropping {:?}", event);
        }
    }
}

impl<P> InputProvider for ButtonInput<P>
where
    P: InputPin,
{
    type Error = ButtonInputError<P::Error>;

    fn poll_event(&mut self) -> Result<Option<ButtonEvent>, Self::Error> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(Some(event));
        }

        for index in 0..BUTTON_ORDER.len() {
            self.poll_button(index)?;
        }

        Ok(self.pending.pop_front())
    }
}

#[inline]
fn pressed_from_level(high: bool, active_low: bool) -> bool {
    if active_low { !high } else { high }
}
