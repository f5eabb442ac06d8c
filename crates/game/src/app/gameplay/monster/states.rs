use engine::fsm::{State, Transition};
use engine::{Camera2D, Painter, Vec2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::app::gameplay::actor::{draw_clip_frame, Clip, Facing, FrameClock, Strike, Vitals};
use crate::app::gameplay::events::{ActorEvent, Cue};

use super::species::{Awareness, Roam, Species};

/// Wandering legs along a diagonal cover `speed / 1.414` per axis.
const DIAGONAL_DIVISOR: f32 = 1.414;

const COMPASS: [(f32, f32); 8] = [
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
    (1.0, 1.0),
    (1.0, -1.0),
    (-1.0, 1.0),
    (-1.0, -1.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MonsterMode {
    Idle,
    Roam,
    Chase,
    Attack,
    Guard,
}

impl MonsterMode {
    pub(crate) fn name(self) -> &'static str {
        match self {
            MonsterMode::Idle => "idle",
            MonsterMode::Roam => "roam",
            MonsterMode::Chase => "chase",
            MonsterMode::Attack => "attack",
            MonsterMode::Guard => "guard",
        }
    }
}

/// What the monster makes of its target this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sense {
    Nothing,
    Detected,
    InReach,
}

pub(crate) struct MonsterBody {
    pub(crate) species: &'static Species,
    pub(crate) position: Vec2,
    pub(crate) facing: Facing,
    pub(crate) clock: FrameClock,
    pub(crate) vitals: Vitals,
    /// Seconds until the next attack is allowed.
    pub(crate) cooldown: f32,
    /// Seconds of heightened awareness left after being hit.
    pub(crate) alert: f32,
    pub(crate) target_position: Option<Vec2>,
    pub(crate) strike: Option<Strike>,
    rng: StdRng,
}

impl MonsterBody {
    pub(crate) fn new(species: &'static Species, position: Vec2, seed: u64) -> Self {
        Self {
            species,
            position,
            facing: Facing::Right,
            clock: FrameClock::default(),
            vitals: Vitals::full(species.max_hp),
            cooldown: 0.0,
            alert: 0.0,
            target_position: None,
            strike: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub(crate) fn is_alerted(&self) -> bool {
        self.alert > 0.0
    }

    /// Counts the cooldown down and reports whether it was still running
    /// when the step began.
    pub(crate) fn cooling_down(&mut self, dt: f32) -> bool {
        if self.cooldown <= 0.0 {
            return false;
        }
        self.cooldown = (self.cooldown - dt).max(0.0);
        true
    }

    pub(crate) fn sense(&self) -> Sense {
        let (Some(senses), Some(target)) = (self.species.senses, self.target_position) else {
            return Sense::Nothing;
        };
        let detect_radius = match senses.awareness {
            Awareness::Always { detect_radius } => detect_radius,
            Awareness::WhenProvoked { .. } if self.is_alerted() => f32::INFINITY,
            Awareness::WhenProvoked { .. } => return Sense::Nothing,
        };
        let distance = self.position.distance(target);
        if self.species.attack.is_some() && distance < senses.attack_radius {
            Sense::InReach
        } else if distance < detect_radius {
            Sense::Detected
        } else {
            Sense::Nothing
        }
    }

    /// Draws the next mode from `choices`, skipping modes the species
    /// cannot enter right now. `cooling` is the step-start cooldown flag, so a
    /// cooldown that ran out mid-step still rules out Attack. Falls back to Idle.
    pub(crate) fn reroll(&mut self, choices: &[MonsterMode], cooling: bool) -> MonsterMode {
        let can_attack = self.species.attack.is_some() && !cooling && self.cooldown <= 0.0;
        let can_guard = self.species.guard.is_some();
        let allowed: Vec<MonsterMode> = choices
            .iter()
            .copied()
            .filter(|mode| match mode {
                MonsterMode::Attack => can_attack,
                MonsterMode::Guard => can_guard,
                MonsterMode::Chase => false,
                MonsterMode::Idle | MonsterMode::Roam => true,
            })
            .collect();
        allowed
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(MonsterMode::Idle)
    }

    fn face_toward(&mut self, point: Vec2) {
        if let Some(facing) = Facing::from_x(point.x - self.position.x) {
            self.facing = facing;
        }
    }

    fn draw_clip(&self, clip: &Clip, painter: &mut dyn Painter, camera: &Camera2D) {
        draw_clip_frame(
            painter,
            camera,
            clip,
            self.species.cell,
            self.clock.index(),
            self.position,
            self.facing,
        );
    }
}

type Step = Option<Transition<MonsterMode, ActorEvent>>;

fn go(to: MonsterMode, cue: Cue) -> Step {
    Some(Transition::new(to, cue.into()))
}

/// Escalation shared by the idle and locomotion states.
fn escalate(sense: Sense) -> Step {
    match sense {
        Sense::InReach => go(MonsterMode::Attack, Cue::InRange),
        Sense::Detected => go(MonsterMode::Chase, Cue::Detected),
        Sense::Nothing => None,
    }
}

#[derive(Default)]
pub(crate) struct IdleState {
    dwell: f32,
}

impl State<MonsterMode, MonsterBody, ActorEvent> for IdleState {
    fn enter(&mut self, body: &mut MonsterBody, _event: &ActorEvent) {
        body.clock.reset();
        self.dwell = 0.0;
    }

    fn step(&mut self, body: &mut MonsterBody, dt: f32) -> Step {
        body.clock.advance_looping(&body.species.idle, dt);
        if body.cooling_down(dt) {
            return None;
        }
        if let Some(transition) = escalate(body.sense()) {
            return Some(transition);
        }
        if body.is_alerted() {
            return None;
        }
        self.dwell += dt;
        if self.dwell < body.species.idle_dwell {
            return None;
        }
        let next = body.reroll(body.species.after_idle, false);
        go(next, Cue::Timeout)
    }

    fn draw(&self, body: &MonsterBody, painter: &mut dyn Painter, camera: &Camera2D) {
        body.draw_clip(&body.species.idle, painter, camera);
    }
}

#[derive(Default)]
pub(crate) struct RoamState {
    elapsed: f32,
    heading: Vec2,
    center: Vec2,
    angle: f32,
}

impl RoamState {
    fn pick_heading(&mut self, body: &mut MonsterBody) {
        self.heading = match body.species.locomotion.roam {
            Roam::Patrol { .. } => {
                let sign = [-1.0_f32, 1.0].choose(&mut body.rng).copied().unwrap_or(1.0);
                Vec2::new(sign, 0.0)
            }
            Roam::Wander { .. } => {
                let (x, y) = COMPASS.choose(&mut body.rng).copied().unwrap_or((1.0, 0.0));
                Vec2::new(x, y)
            }
            Roam::Circle { .. } => Vec2::ZERO,
        };
        if let Some(facing) = Facing::from_x(self.heading.x) {
            body.facing = facing;
        }
    }

    fn advance(&mut self, body: &mut MonsterBody, dt: f32) {
        match body.species.locomotion.roam {
            Roam::Patrol { speed } => {
                body.position += self.heading * (speed * dt);
            }
            Roam::Wander { speed } => {
                let diagonal = self.heading.x != 0.0 && self.heading.y != 0.0;
                let speed = if diagonal {
                    speed / DIAGONAL_DIVISOR
                } else {
                    speed
                };
                body.position += self.heading * (speed * dt);
            }
            Roam::Circle {
                radius,
                angular_speed,
            } => {
                self.angle += angular_speed * dt;
                let (sin, cos) = self.angle.sin_cos();
                body.position = self.center + Vec2::new(cos, sin) * radius;
                body.facing = if cos > 0.0 { Facing::Right } else { Facing::Left };
            }
        }
    }
}

impl State<MonsterMode, MonsterBody, ActorEvent> for RoamState {
    fn enter(&mut self, body: &mut MonsterBody, _event: &ActorEvent) {
        body.clock.reset();
        self.elapsed = 0.0;
        self.angle = 0.0;
        self.center = body.position;
        self.pick_heading(body);
    }

    fn step(&mut self, body: &mut MonsterBody, dt: f32) -> Step {
        let cooling = body.cooling_down(dt);
        let sense = body.sense();
        if cooling {
            if sense != Sense::Nothing {
                return go(MonsterMode::Idle, Cue::Cooldown);
            }
        } else if let Some(transition) = escalate(sense) {
            return Some(transition);
        }

        self.advance(body, dt);
        body.clock.advance_looping(&body.species.locomotion.clip, dt);
        self.elapsed += dt;
        if self.elapsed < body.species.locomotion.duration {
            return None;
        }
        let next = body.reroll(body.species.after_roam, cooling);
        go(next, Cue::Timeout)
    }

    fn draw(&self, body: &MonsterBody, painter: &mut dyn Painter, camera: &Camera2D) {
        body.draw_clip(&body.species.locomotion.clip, painter, camera);
    }
}

pub(crate) struct ChaseState;

impl State<MonsterMode, MonsterBody, ActorEvent> for ChaseState {
    fn enter(&mut self, body: &mut MonsterBody, _event: &ActorEvent) {
        body.clock.reset();
    }

    fn step(&mut self, body: &mut MonsterBody, dt: f32) -> Step {
        if body.cooling_down(dt) {
            return go(MonsterMode::Idle, Cue::Cooldown);
        }
        let (Some(senses), Some(target)) = (body.species.senses, body.target_position) else {
            return go(MonsterMode::Idle, Cue::LostTarget);
        };
        match body.sense() {
            Sense::InReach => go(MonsterMode::Attack, Cue::InRange),
            Sense::Nothing => go(MonsterMode::Idle, Cue::LostTarget),
            Sense::Detected => {
                let direction = (target - body.position).normalized();
                body.position += direction * (senses.chase_speed * dt);
                body.face_toward(target);
                body.clock.advance_looping(&senses.chase_clip, dt);
                None
            }
        }
    }

    fn draw(&self, body: &MonsterBody, painter: &mut dyn Painter, camera: &Camera2D) {
        let clip = body
            .species
            .senses
            .map_or(body.species.locomotion.clip, |senses| senses.chase_clip);
        body.draw_clip(&clip, painter, camera);
    }
}

/// Stands still for the species' attack duration; the clip holds its last
/// frame once it runs out.
#[derive(Default)]
pub(crate) struct AttackState {
    elapsed: f32,
    struck: bool,
}

impl State<MonsterMode, MonsterBody, ActorEvent> for AttackState {
    fn enter(&mut self, body: &mut MonsterBody, _event: &ActorEvent) {
        body.clock.reset();
        body.strike = None;
        self.elapsed = 0.0;
        self.struck = false;
        if let Some(target) = body.target_position {
            body.face_toward(target);
        }
    }

    fn exit(&mut self, body: &mut MonsterBody, _event: &ActorEvent) {
        body.strike = None;
        if let Some(attack) = body.species.attack {
            body.cooldown = attack.cooldown;
        }
    }

    fn step(&mut self, body: &mut MonsterBody, dt: f32) -> Step {
        let Some(attack) = body.species.attack else {
            return go(MonsterMode::Idle, Cue::AnimationEnd);
        };
        body.clock.advance_clamped(&attack.clip, dt);
        self.elapsed += dt;

        if attack.window.contains(body.clock.index()) {
            if !self.struck {
                self.struck = true;
                body.strike = Some(Strike {
                    reach: attack.reach,
                    height: attack.height,
                    power: body.species.attack_power,
                });
                debug!(
                    species = body.species.name,
                    power = body.species.attack_power,
                    "monster_strike"
                );
            }
        } else {
            body.strike = None;
        }

        if self.elapsed >= attack.duration {
            return go(MonsterMode::Idle, Cue::AnimationEnd);
        }
        None
    }

    fn draw(&self, body: &MonsterBody, painter: &mut dyn Painter, camera: &Camera2D) {
        if let Some(attack) = body.species.attack {
            body.draw_clip(&attack.clip, painter, camera);
        }
    }
}

#[derive(Default)]
pub(crate) struct GuardState {
    elapsed: f32,
}

impl State<MonsterMode, MonsterBody, ActorEvent> for GuardState {
    fn enter(&mut self, body: &mut MonsterBody, _event: &ActorEvent) {
        body.clock.reset();
        self.elapsed = 0.0;
    }

    fn step(&mut self, body: &mut MonsterBody, dt: f32) -> Step {
        let cooling = body.cooling_down(dt);
        let Some(guard) = body.species.guard else {
            return go(MonsterMode::Idle, Cue::Timeout);
        };
        body.clock.advance_looping(&guard.clip, dt);
        self.elapsed += dt;
        if self.elapsed < guard.duration {
            return None;
        }
        let next = body.reroll(body.species.after_guard, cooling);
        go(next, Cue::Timeout)
    }

    fn draw(&self, body: &MonsterBody, painter: &mut dyn Painter, camera: &Camera2D) {
        if let Some(guard) = body.species.guard {
            body.draw_clip(&guard.clip, painter, camera);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::gameplay::monster::species::{GNOME, PANDA, PATROLLER, WANDERER};

    fn spawn_cue() -> ActorEvent {
        ActorEvent::Cue(Cue::Spawn)
    }

    #[test]
    fn gnome_senses_by_distance() {
        let mut body = MonsterBody::new(&GNOME, Vec2::ZERO, 1);
        assert_eq!(body.sense(), Sense::Nothing);
        body.target_position = Some(Vec2::new(50.0, 0.0));
        assert_eq!(body.sense(), Sense::InReach);
        body.target_position = Some(Vec2::new(200.0, 0.0));
        assert_eq!(body.sense(), Sense::Detected);
        body.target_position = Some(Vec2::new(300.0, 0.0));
        assert_eq!(body.sense(), Sense::Nothing);
    }

    #[test]
    fn provoked_species_only_sense_while_alerted() {
        let mut body = MonsterBody::new(&PANDA, Vec2::ZERO, 1);
        body.target_position = Some(Vec2::new(5000.0, 0.0));
        assert_eq!(body.sense(), Sense::Nothing);
        body.alert = 1.0;
        assert_eq!(body.sense(), Sense::Detected);
    }

    #[test]
    fn cooldown_suppresses_escalation() {
        let mut body = MonsterBody::new(&GNOME, Vec2::ZERO, 1);
        body.target_position = Some(Vec2::new(50.0, 0.0));
        body.cooldown = 0.05;
        let mut idle = IdleState::default();
        idle.enter(&mut body, &spawn_cue());
        assert!(idle.step(&mut body, 0.1).is_none());
        assert_eq!(body.cooldown, 0.0);

        let next = idle.step(&mut body, 0.1).expect("attack");
        assert_eq!(next.to, MonsterMode::Attack);
    }

    #[test]
    fn roam_falls_back_to_idle_when_cooling_near_target() {
        let mut body = MonsterBody::new(&GNOME, Vec2::ZERO, 1);
        body.target_position = Some(Vec2::new(150.0, 0.0));
        body.cooldown = 1.0;
        let mut roam = RoamState::default();
        roam.enter(&mut body, &spawn_cue());
        let next = roam.step(&mut body, 0.1).expect("idle");
        assert_eq!(next.to, MonsterMode::Idle);
        assert_eq!(next.cause, ActorEvent::Cue(Cue::Cooldown));
    }

    #[test]
    fn wander_diagonals_are_slowed() {
        let mut body = MonsterBody::new(&WANDERER, Vec2::ZERO, 1);
        let mut roam = RoamState::default();
        roam.enter(&mut body, &spawn_cue());
        roam.heading = Vec2::new(1.0, 1.0);
        roam.step(&mut body, 1.0);
        let expected = 200.0 / DIAGONAL_DIVISOR;
        assert!((body.position.x - expected).abs() < 1e-3);
        assert!((body.position.y - expected).abs() < 1e-3);
    }

    #[test]
    fn circle_orbits_entry_position() {
        let mut body = MonsterBody::new(&PANDA, Vec2::new(500.0, 500.0), 1);
        let mut roam = RoamState::default();
        roam.enter(&mut body, &spawn_cue());
        for _ in 0..10 {
            roam.step(&mut body, 0.1);
            let radius = body.position.distance(Vec2::new(500.0, 500.0));
            assert!((radius - 100.0).abs() < 1e-2);
        }
    }

    #[test]
    fn patrol_leg_ends_with_reroll() {
        let mut body = MonsterBody::new(&PATROLLER, Vec2::ZERO, 7);
        let mut roam = RoamState::default();
        roam.enter(&mut body, &spawn_cue());
        assert!(roam.step(&mut body, 1.0).is_none());
        assert!((body.position.x.abs() - 150.0).abs() < 1e-3);
        roam.step(&mut body, 1.0);
        let next = roam.step(&mut body, 1.0).expect("leg over");
        assert_eq!(next.to, MonsterMode::Idle);
    }

    #[test]
    fn reroll_never_picks_attack_while_cooling() {
        let mut body = MonsterBody::new(&PANDA, Vec2::ZERO, 3);
        body.cooldown = 1.0;
        for _ in 0..50 {
            let mode = body.reroll(PANDA.after_roam, false);
            assert_ne!(mode, MonsterMode::Attack);
        }
        let mut plain = MonsterBody::new(&PATROLLER, Vec2::ZERO, 3);
        assert_eq!(plain.reroll(&[MonsterMode::Attack, MonsterMode::Guard], false), MonsterMode::Idle);
    }

    #[test]
    fn roam_leg_ending_as_cooldown_expires_never_picks_attack() {
        for seed in 0..200 {
            let mut body = MonsterBody::new(&PANDA, Vec2::ZERO, seed);
            let mut roam = RoamState::default();
            roam.enter(&mut body, &spawn_cue());
            body.cooldown = 0.05;
            let next = roam.step(&mut body, 5.0).expect("leg over");
            assert_eq!(body.cooldown, 0.0);
            assert_ne!(next.to, MonsterMode::Attack, "seed {seed}");
        }
    }

    #[test]
    fn guard_ending_as_cooldown_expires_never_picks_attack() {
        for seed in 0..200 {
            let mut body = MonsterBody::new(&PANDA, Vec2::ZERO, seed);
            let mut guard = GuardState::default();
            guard.enter(&mut body, &spawn_cue());
            body.cooldown = 0.05;
            let next = guard.step(&mut body, 2.0).expect("guard over");
            assert_eq!(body.cooldown, 0.0);
            assert_ne!(next.to, MonsterMode::Attack, "seed {seed}");
        }
    }

    #[test]
    fn attack_exposes_hitbox_in_window_and_arms_cooldown() {
        let mut body = MonsterBody::new(&GNOME, Vec2::ZERO, 1);
        body.target_position = Some(Vec2::new(-50.0, 0.0));
        let mut attack = AttackState::default();
        attack.enter(&mut body, &spawn_cue());
        assert_eq!(body.facing, Facing::Left);

        let mut saw_strike = false;
        let mut finished = None;
        for _ in 0..10 {
            finished = attack.step(&mut body, 0.1);
            saw_strike |= body.strike.is_some();
            if finished.is_some() {
                break;
            }
        }
        assert!(saw_strike);
        assert_eq!(finished.map(|step| step.to), Some(MonsterMode::Idle));
        attack.exit(&mut body, &spawn_cue());
        assert!(body.strike.is_none());
        assert_eq!(body.cooldown, 2.0);
    }
}
