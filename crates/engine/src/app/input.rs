use crate::geometry::Vec2;

/// Keys the game reacts to. Everything else is dropped by the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    A,
    F,
    Digit0,
    Digit7,
    Digit8,
    Digit9,
    Delete,
    Backspace,
    Space,
    Enter,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
}

/// Discrete input delivered to scenes in arrival order. Pointer positions
/// are screen pixels with the origin at the bottom-left of the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    MouseDown { button: MouseButton, position: Vec2 },
    MouseUp { button: MouseButton, position: Vec2 },
    MouseMotion { position: Vec2 },
}

impl InputEvent {
    pub fn is_key_down(&self, key: Key) -> bool {
        *self == InputEvent::KeyDown(key)
    }

    pub fn is_key_up(&self, key: Key) -> bool {
        *self == InputEvent::KeyUp(key)
    }

    pub fn pointer_position(&self) -> Option<Vec2> {
        match self {
            InputEvent::MouseDown { position, .. }
            | InputEvent::MouseUp { position, .. }
            | InputEvent::MouseMotion { position } => Some(*position),
            InputEvent::KeyDown(_) | InputEvent::KeyUp(_) => None,
        }
    }
}
