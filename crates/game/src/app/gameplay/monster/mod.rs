//! AI-driven monsters sharing one parameterized state set.

mod species;
mod states;

use engine::fsm::{FsmError, StateMachine};
use engine::{Aabb, Camera2D, InputEvent, Painter, Vec2};
use tracing::debug;

use super::actor::{knockback_offset, Actor, ActorId, Control, Vitals};
use super::events::{ActorEvent, Cue};

pub(crate) use species::{Species, GNOME, ORBITER, PADDLEFISH, PANDA, PATROLLER, WANDERER};
pub(crate) use states::MonsterMode;
use states::{AttackState, ChaseState, GuardState, IdleState, MonsterBody, RoamState};

type MonsterMachine = StateMachine<MonsterMode, MonsterBody, ActorEvent>;

pub(crate) struct Monster {
    id: ActorId,
    body: MonsterBody,
    machine: MonsterMachine,
    target: Option<ActorId>,
}

impl Monster {
    pub(crate) fn new(id: ActorId, species: &'static Species, position: Vec2) -> Result<Self, FsmError> {
        let mut body = MonsterBody::new(species, position, id.0);
        let mut builder = StateMachine::builder()
            .state(MonsterMode::Idle, IdleState::default())
            .state(MonsterMode::Roam, RoamState::default())
            .initial(MonsterMode::Idle);
        if species.senses.is_some() {
            builder = builder.state(MonsterMode::Chase, ChaseState);
        }
        if species.attack.is_some() {
            builder = builder.state(MonsterMode::Attack, AttackState::default());
        }
        if species.guard.is_some() {
            builder = builder.state(MonsterMode::Guard, GuardState::default());
        }
        let mut machine = builder.build()?;
        machine.start(&mut body, &Cue::Spawn.into());
        Ok(Self {
            id,
            body,
            machine,
            target: None,
        })
    }

    pub(crate) fn mode(&self) -> MonsterMode {
        self.machine.current()
    }

    #[cfg(test)]
    pub(crate) fn cooldown(&self) -> f32 {
        self.body.cooldown
    }

    #[cfg(test)]
    pub(crate) fn set_cooldown(&mut self, seconds: f32) {
        self.body.cooldown = seconds;
    }
}

impl Actor for Monster {
    fn id(&self) -> ActorId {
        self.id
    }

    fn name(&self) -> &'static str {
        self.body.species.name
    }

    fn control(&self) -> Control {
        Control::Ai
    }

    fn mode_name(&self) -> &'static str {
        self.mode().name()
    }

    fn position(&self) -> Vec2 {
        self.body.position
    }

    fn set_position(&mut self, position: Vec2) {
        self.body.position = position;
    }

    fn update(&mut self, dt: f32) {
        if !self.is_alive() {
            return;
        }
        self.body.alert = (self.body.alert - dt).max(0.0);
        self.machine.update(&mut self.body, dt);
    }

    fn draw(&self, painter: &mut dyn Painter, camera: &Camera2D) {
        self.machine.draw(&self.body, painter, camera);
    }

    fn handle_event(&mut self, _event: &InputEvent) {}

    fn bounding_box(&self) -> Aabb {
        Aabb::from_half_extent(self.body.position, self.body.species.body_half)
    }

    fn attack_bounding_box(&self) -> Option<Aabb> {
        self.body
            .strike
            .map(|strike| strike.hitbox(self.body.position, self.body.facing))
    }

    fn current_attack_power(&self) -> u32 {
        self.body.strike.map_or(0, |strike| strike.power)
    }

    fn take_damage(&mut self, amount: u32, attacker_x: Option<f32>) {
        self.body.vitals.apply_damage(amount);
        if let Some(attacker_x) = attacker_x {
            self.body.position.x += knockback_offset(self.body.position.x, attacker_x);
        }
        if let Some(alert_seconds) = self.body.species.alert_seconds() {
            self.body.alert = alert_seconds;
        }
    }

    fn vitals(&self) -> Vitals {
        self.body.vitals
    }

    fn is_alive(&self) -> bool {
        !self.body.vitals.is_depleted()
    }

    fn target(&self) -> Option<ActorId> {
        self.target
    }

    fn set_target(&mut self, target: Option<ActorId>) {
        self.target = target;
        if target.is_none() {
            self.body.target_position = None;
        }
    }

    fn observe_target(&mut self, position: Option<Vec2>) {
        self.body.target_position = position;
    }

    fn provoke(&mut self, attacker: ActorId) {
        if self.body.species.alert_seconds().is_none() || self.target == Some(attacker) {
            return;
        }
        debug!(species = self.body.species.name, attacker = attacker.0, "monster_provoked");
        self.target = Some(attacker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn species_without_attack_have_no_attack_state() {
        let mut patroller =
            Monster::new(ActorId(4), &PATROLLER, Vec2::ZERO).expect("patroller");
        for _ in 0..100 {
            patroller.update(0.1);
            assert!(matches!(patroller.mode(), MonsterMode::Idle | MonsterMode::Roam));
            assert!(patroller.attack_bounding_box().is_none());
        }
    }

    #[test]
    fn hit_alerts_provoked_species_and_retargets() {
        let mut panda = Monster::new(ActorId(5), &PANDA, Vec2::new(300.0, 0.0)).expect("panda");
        panda.take_damage(10, Some(250.0));
        panda.provoke(ActorId(1));
        assert_eq!(panda.target(), Some(ActorId(1)));
        assert_eq!(panda.position().x, 320.0);

        panda.observe_target(Some(Vec2::new(-2000.0, 0.0)));
        panda.update(0.1);
        assert_eq!(panda.mode(), MonsterMode::Chase);
    }

    #[test]
    fn hit_from_the_left_knocks_monster_right() {
        let mut gnome = Monster::new(ActorId(7), &GNOME, Vec2::new(150.0, 0.0)).expect("gnome");
        gnome.take_damage(30, Some(100.0));
        assert_eq!(gnome.position().x, 170.0);
        assert_eq!(gnome.vitals().hp, 70);
        assert!(gnome.is_alive());
    }

    #[test]
    fn always_aware_species_ignore_provocation() {
        let mut gnome = Monster::new(ActorId(6), &GNOME, Vec2::ZERO).expect("gnome");
        gnome.set_target(Some(ActorId(1)));
        gnome.provoke(ActorId(9));
        assert_eq!(gnome.target(), Some(ActorId(1)));
    }
}
