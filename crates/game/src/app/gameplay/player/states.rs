use engine::fsm::{State, Transition};
use engine::{Camera2D, InputEvent, Key, Painter, Vec2};
use tracing::debug;

use crate::app::gameplay::actor::{draw_clip_frame, Clip, Facing, FrameClock, Strike, Vitals};
use crate::app::gameplay::events::{ActorEvent, Cue};

use super::profile::{AttackMove, PlayerProfile};

/// Time after Attack1 during which another attack chains into Attack2.
pub(crate) const COMBO_GRACE_SECONDS: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlayerMode {
    Idle,
    Run,
    Attack1,
    Attack2,
}

impl PlayerMode {
    pub(crate) fn name(self) -> &'static str {
        match self {
            PlayerMode::Idle => "idle",
            PlayerMode::Run => "run",
            PlayerMode::Attack1 => "attack1",
            PlayerMode::Attack2 => "attack2",
        }
    }
}

/// Held direction keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct MoveKeys {
    left: bool,
    right: bool,
    up: bool,
    down: bool,
}

impl MoveKeys {
    pub(crate) fn apply(&mut self, event: &InputEvent) {
        let (key, held) = match event {
            InputEvent::KeyDown(key) => (*key, true),
            InputEvent::KeyUp(key) => (*key, false),
            _ => return,
        };
        match key {
            Key::Left => self.left = held,
            Key::Right => self.right = held,
            Key::Up => self.up = held,
            Key::Down => self.down = held,
            _ => {}
        }
    }

    pub(crate) fn any(&self) -> bool {
        self.left || self.right || self.up || self.down
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }

    /// Unit-length direction of the held keys; zero when they cancel out.
    pub(crate) fn direction(&self) -> Vec2 {
        let axis = |negative: bool, positive: bool| match (negative, positive) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        Vec2::new(axis(self.left, self.right), axis(self.down, self.up)).normalized()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct ComboWindow {
    open: bool,
    elapsed: f32,
}

impl ComboWindow {
    pub(crate) fn open(&mut self) {
        self.open = true;
        self.elapsed = 0.0;
    }

    pub(crate) fn close(&mut self) {
        self.open = false;
        self.elapsed = 0.0;
    }

    pub(crate) fn is_open(&self) -> bool {
        self.open
    }

    pub(crate) fn tick(&mut self, dt: f32) {
        if !self.open {
            return;
        }
        self.elapsed += dt;
        if self.elapsed > COMBO_GRACE_SECONDS {
            self.close();
        }
    }
}

/// Mutable state shared by every player state.
#[derive(Debug, Clone)]
pub(crate) struct PlayerBody {
    pub(crate) profile: &'static PlayerProfile,
    pub(crate) position: Vec2,
    pub(crate) facing: Facing,
    pub(crate) intent: Vec2,
    pub(crate) keys: MoveKeys,
    pub(crate) clock: FrameClock,
    pub(crate) vitals: Vitals,
    pub(crate) combo: ComboWindow,
    pub(crate) strike: Option<Strike>,
}

impl PlayerBody {
    pub(crate) fn new(profile: &'static PlayerProfile, position: Vec2) -> Self {
        Self {
            profile,
            position,
            facing: Facing::Right,
            intent: Vec2::ZERO,
            keys: MoveKeys::default(),
            clock: FrameClock::default(),
            vitals: Vitals::full(profile.max_hp),
            combo: ComboWindow::default(),
            strike: None,
        }
    }

    fn draw_clip(&self, clip: &Clip, painter: &mut dyn Painter, camera: &Camera2D) {
        draw_clip_frame(
            painter,
            camera,
            clip,
            self.profile.cell,
            self.clock.index(),
            self.position,
            self.facing,
        );
    }
}

pub(crate) fn any_direction_down(event: &ActorEvent, _body: &PlayerBody) -> bool {
    event.is_direction_down()
}

pub(crate) fn combo_attack(event: &ActorEvent, body: &PlayerBody) -> bool {
    event.is_key_down(Key::A) && body.combo.is_open()
}

pub(crate) fn plain_attack(event: &ActorEvent, body: &PlayerBody) -> bool {
    event.is_key_down(Key::A) && !body.combo.is_open()
}

pub(crate) struct IdleState;

impl State<PlayerMode, PlayerBody, ActorEvent> for IdleState {
    fn enter(&mut self, body: &mut PlayerBody, _event: &ActorEvent) {
        body.intent = Vec2::ZERO;
        body.clock.reset();
    }

    fn step(
        &mut self,
        body: &mut PlayerBody,
        dt: f32,
    ) -> Option<Transition<PlayerMode, ActorEvent>> {
        body.clock.advance_looping(&body.profile.idle, dt);
        body.combo.tick(dt);
        None
    }

    fn draw(&self, body: &PlayerBody, painter: &mut dyn Painter, camera: &Camera2D) {
        body.draw_clip(&body.profile.idle, painter, camera);
    }
}

pub(crate) struct RunState;

impl State<PlayerMode, PlayerBody, ActorEvent> for RunState {
    fn enter(&mut self, body: &mut PlayerBody, _event: &ActorEvent) {
        body.clock.reset();
    }

    fn step(
        &mut self,
        body: &mut PlayerBody,
        dt: f32,
    ) -> Option<Transition<PlayerMode, ActorEvent>> {
        body.combo.tick(dt);
        if !body.keys.any() {
            return Some(Transition::new(PlayerMode::Idle, Cue::Stop.into()));
        }
        body.intent = body.keys.direction();
        if let Some(facing) = Facing::from_x(body.intent.x) {
            body.facing = facing;
        }
        body.position += body.intent * (body.profile.speed * dt);
        body.clock.advance_looping(&body.profile.run, dt);
        None
    }

    fn draw(&self, body: &PlayerBody, painter: &mut dyn Painter, camera: &Camera2D) {
        body.draw_clip(&body.profile.run, painter, camera);
    }
}

/// Non-looping swing. The hitbox is exposed while the animation sits in
/// the move's active frames.
pub(crate) struct AttackState {
    mode: PlayerMode,
    attack: AttackMove,
    reach: f32,
    height: f32,
    struck: bool,
}

impl AttackState {
    pub(crate) fn new(mode: PlayerMode, attack: AttackMove, reach: f32, height: f32) -> Self {
        Self {
            mode,
            attack,
            reach,
            height,
            struck: false,
        }
    }
}

impl State<PlayerMode, PlayerBody, ActorEvent> for AttackState {
    fn enter(&mut self, body: &mut PlayerBody, _event: &ActorEvent) {
        body.intent = Vec2::ZERO;
        body.clock.reset();
        body.combo.close();
        body.strike = None;
        self.struck = false;
    }

    fn exit(&mut self, body: &mut PlayerBody, _event: &ActorEvent) {
        body.strike = None;
    }

    fn step(
        &mut self,
        body: &mut PlayerBody,
        dt: f32,
    ) -> Option<Transition<PlayerMode, ActorEvent>> {
        let finished = body.clock.advance_once(&self.attack.clip, dt);
        if finished {
            body.strike = None;
            if self.mode == PlayerMode::Attack1 {
                body.combo.open();
            }
            let next = if body.keys.any() {
                PlayerMode::Run
            } else {
                PlayerMode::Idle
            };
            return Some(Transition::new(next, Cue::AnimationEnd.into()));
        }

        if self.attack.window.contains(body.clock.index()) {
            if !self.struck {
                self.struck = true;
                let power = body.profile.scaled_power(self.attack.power_scale);
                body.strike = Some(Strike {
                    reach: self.reach,
                    height: self.height,
                    power,
                });
                debug!(
                    character = body.profile.name,
                    mode = self.mode.name(),
                    power,
                    "player_strike"
                );
            }
        } else {
            body.strike = None;
        }
        None
    }

    fn draw(&self, body: &PlayerBody, painter: &mut dyn Painter, camera: &Camera2D) {
        body.draw_clip(&self.attack.clip, painter, camera);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::gameplay::player::profile::WARRIOR;

    fn warrior_body() -> PlayerBody {
        PlayerBody::new(&WARRIOR, Vec2::new(300.0, 300.0))
    }

    #[test]
    fn diagonal_direction_is_unit_length() {
        let mut keys = MoveKeys::default();
        keys.apply(&InputEvent::KeyDown(Key::Right));
        keys.apply(&InputEvent::KeyDown(Key::Up));
        let direction = keys.direction();
        assert!((direction.length() - 1.0).abs() < 1e-5);
        assert!(direction.x > 0.0 && direction.y > 0.0);

        keys.apply(&InputEvent::KeyDown(Key::Left));
        assert_eq!(keys.direction(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn combo_window_closes_after_grace() {
        let mut combo = ComboWindow::default();
        combo.open();
        combo.tick(0.3);
        assert!(combo.is_open());
        combo.tick(0.3);
        assert!(!combo.is_open());
    }

    #[test]
    fn attack_guards_are_mutually_exclusive() {
        let mut body = warrior_body();
        let attack = ActorEvent::Input(InputEvent::KeyDown(Key::A));
        assert!(plain_attack(&attack, &body));
        assert!(!combo_attack(&attack, &body));

        body.combo.open();
        assert!(!plain_attack(&attack, &body));
        assert!(combo_attack(&attack, &body));
    }

    #[test]
    fn run_returns_to_idle_once_keys_are_released() {
        let mut body = warrior_body();
        let mut run = RunState;
        run.enter(&mut body, &ActorEvent::Cue(Cue::Spawn));
        body.keys.apply(&InputEvent::KeyDown(Key::Right));
        assert!(run.step(&mut body, 0.1).is_none());
        assert!((body.position.x - 330.0).abs() < 1e-3);

        body.keys.apply(&InputEvent::KeyUp(Key::Right));
        let transition = run.step(&mut body, 0.1).expect("stop");
        assert_eq!(transition.to, PlayerMode::Idle);
    }

    #[test]
    fn attack_strikes_once_inside_window() {
        let attacks = WARRIOR.attacks.expect("attacks");
        let mut body = warrior_body();
        let mut attack = AttackState::new(PlayerMode::Attack1, attacks.first, 80.0, 60.0);
        attack.enter(&mut body, &ActorEvent::Cue(Cue::Spawn));
        assert!(body.strike.is_none());

        assert!(attack.step(&mut body, 0.1).is_none());
        assert_eq!(body.strike.map(|strike| strike.power), Some(25));
        assert!(attack.struck);

        assert!(attack.step(&mut body, 0.1).is_none());
        assert!(body.strike.is_some());

        assert!(attack.step(&mut body, 0.1).is_none());
        assert!(body.strike.is_none());

        let done = attack.step(&mut body, 0.5).expect("finished");
        assert_eq!(done.to, PlayerMode::Idle);
        assert!(body.combo.is_open());
    }
}
