use engine::{InputEvent, Key};

/// Why a state machine moved, passed to `enter`/`exit`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ActorEvent {
    Input(InputEvent),
    Cue(Cue),
}

/// Internal causes produced by the states themselves or by the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cue {
    Spawn,
    /// Movement keys released.
    Stop,
    AnimationEnd,
    Timeout,
    Detected,
    InRange,
    LostTarget,
    Cooldown,
    /// Forced back to rest by the world, e.g. on character swap.
    Halt,
}

impl ActorEvent {
    pub(crate) fn is_key_down(&self, key: Key) -> bool {
        matches!(self, ActorEvent::Input(input) if input.is_key_down(key))
    }

    pub(crate) fn is_direction_down(&self) -> bool {
        [Key::Left, Key::Right, Key::Up, Key::Down]
            .into_iter()
            .any(|key| self.is_key_down(key))
    }
}

impl From<Cue> for ActorEvent {
    fn from(cue: Cue) -> Self {
        ActorEvent::Cue(cue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_detection_ignores_other_keys_and_releases() {
        assert!(ActorEvent::Input(InputEvent::KeyDown(Key::Up)).is_direction_down());
        assert!(!ActorEvent::Input(InputEvent::KeyUp(Key::Up)).is_direction_down());
        assert!(!ActorEvent::Input(InputEvent::KeyDown(Key::A)).is_direction_down());
        assert!(!ActorEvent::Cue(Cue::Spawn).is_direction_down());
    }
}
