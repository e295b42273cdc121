//! Input abstraction layer.

pub mod mock;

/// Physical buttons, named after their position on the watch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Button {
    Back,
    Up,
    Select,
    Down,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Gesture {
    /// Raw contact closed.
    Pressed,
    /// Raw contact opened.
    Released,
    /// Released before the long-press threshold.
    Click,
    /// Held past the long-press threshold. Emitted once per hold.
    LongPress,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ButtonEvent {
    pub button: Button,
    pub gesture: Gesture,
}

impl ButtonEvent {
    pub const fn new(button: Button, gesture: Gesture) -> Self {
        Self { button, gesture }
    }

    pub const fn click(button: Button) -> Self {
        Self::new(button, Gesture::Click)
    }

    pub const fn long_press(button: Button) -> Self {
        Self::new(button, Gesture::LongPress)
    }

    pub const fn pressed(button: Button) -> Self {
        Self::new(button, Gesture::Pressed)
    }

    pub const fn released(button: Button) -> Self {
        Self::new(button, Gesture::Released)
    }
}

/// Polled input provider.
pub trait InputProvider {
    type Error;

    fn poll_event(&mut self) -> Result<Option<ButtonEvent>, Self::Error>;
}
