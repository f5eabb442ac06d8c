use tracing::info;

use super::input::InputEvent;
use super::rendering::Painter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKey {
    Title,
    Play,
}

impl SceneKey {
    fn slot(self) -> usize {
        match self {
            SceneKey::Title => 0,
            SceneKey::Play => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    SwitchTo(SceneKey),
    Quit,
}

/// Input gathered since the previous fixed tick.
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    events: Vec<InputEvent>,
    window_size: (u32, u32),
}

impl InputSnapshot {
    pub fn new(
        quit_requested: bool,
        events: Vec<InputEvent>,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            events,
            window_size: (window_width, window_height),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn events(&self) -> &[InputEvent] {
        &self.events
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    pub fn with_event(mut self, event: InputEvent) -> Self {
        self.events.push(event);
        self
    }
}

pub trait Scene {
    fn load(&mut self);
    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand;
    fn render(&self, painter: &mut dyn Painter);
    fn unload(&mut self);
    fn debug_title(&self) -> Option<String> {
        None
    }
}

struct SceneSlot {
    scene: Box<dyn Scene>,
    loaded: bool,
}

impl SceneSlot {
    fn ensure_loaded(&mut self) {
        if !self.loaded {
            self.scene.load();
            self.loaded = true;
        }
    }

    fn release(&mut self) {
        if self.loaded {
            self.scene.unload();
            self.loaded = false;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    Continue,
    Quit,
}

/// Title and play scenes; exactly one is active. Scenes load lazily on first
/// activation and stay loaded until shutdown.
pub(crate) struct SceneMachine {
    slots: [SceneSlot; 2],
    active: SceneKey,
}

impl SceneMachine {
    pub(crate) fn new(title: Box<dyn Scene>, play: Box<dyn Scene>, active: SceneKey) -> Self {
        let slot = |scene| SceneSlot {
            scene,
            loaded: false,
        };
        Self {
            slots: [slot(title), slot(play)],
            active,
        }
    }

    pub(crate) fn active_scene(&self) -> SceneKey {
        self.active
    }

    pub(crate) fn load_active(&mut self) {
        self.slots[self.active.slot()].ensure_loaded();
        info!(scene = ?self.active, "scene_loaded");
    }

    /// Runs one fixed tick of the active scene and applies the command it
    /// returns.
    pub(crate) fn tick(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> TickOutcome {
        let command = self.slots[self.active.slot()]
            .scene
            .update(fixed_dt_seconds, input);
        match command {
            SceneCommand::None => TickOutcome::Continue,
            SceneCommand::SwitchTo(next) => {
                if self.switch_to(next) {
                    info!(scene = ?next, "scene_switched");
                }
                TickOutcome::Continue
            }
            SceneCommand::Quit => TickOutcome::Quit,
        }
    }

    pub(crate) fn render_active(&self, painter: &mut dyn Painter) {
        self.slots[self.active.slot()].scene.render(painter);
    }

    pub(crate) fn debug_title_active(&self) -> Option<String> {
        self.slots[self.active.slot()].scene.debug_title()
    }

    /// Returns whether the active scene changed.
    pub(crate) fn switch_to(&mut self, next: SceneKey) -> bool {
        if self.active == next {
            return false;
        }
        self.slots[next.slot()].ensure_loaded();
        self.active = next;
        true
    }

    pub(crate) fn shutdown_all(&mut self) {
        self.slots.iter_mut().for_each(SceneSlot::release);
    }
}
