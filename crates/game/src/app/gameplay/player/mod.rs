//! Keyboard-driven characters.

mod profile;
mod states;

use engine::fsm::{FsmError, StateMachine};
use engine::{Aabb, Camera2D, InputEvent, Painter, Vec2};

use super::actor::{knockback_offset, Actor, ActorId, Control, Vitals};
use super::events::{ActorEvent, Cue};

pub(crate) use profile::{PlayerProfile, CHILD, WARRIOR};
pub(crate) use states::PlayerMode;
use states::{
    any_direction_down, combo_attack, plain_attack, AttackState, IdleState, PlayerBody, RunState,
};

type PlayerMachine = StateMachine<PlayerMode, PlayerBody, ActorEvent>;

pub(crate) struct PlayerCharacter {
    id: ActorId,
    body: PlayerBody,
    machine: PlayerMachine,
}

impl PlayerCharacter {
    pub(crate) fn new(
        id: ActorId,
        profile: &'static PlayerProfile,
        position: Vec2,
    ) -> Result<Self, FsmError> {
        let mut body = PlayerBody::new(profile, position);
        let mut machine = build_machine(profile)?;
        machine.start(&mut body, &Cue::Spawn.into());
        Ok(Self { id, body, machine })
    }

    pub(crate) fn mode(&self) -> PlayerMode {
        self.machine.current()
    }
}

fn build_machine(profile: &PlayerProfile) -> Result<PlayerMachine, FsmError> {
    let builder = StateMachine::builder()
        .state(PlayerMode::Idle, IdleState)
        .state(PlayerMode::Run, RunState)
        .initial(PlayerMode::Idle)
        .rule(PlayerMode::Idle, any_direction_down, PlayerMode::Run);

    let Some(attacks) = profile.attacks else {
        return builder.build();
    };
    let grounded = [PlayerMode::Idle, PlayerMode::Run];
    builder
        .state(
            PlayerMode::Attack1,
            AttackState::new(PlayerMode::Attack1, attacks.first, attacks.reach, attacks.height),
        )
        .state(
            PlayerMode::Attack2,
            AttackState::new(PlayerMode::Attack2, attacks.second, attacks.reach, attacks.height),
        )
        .rules_from(&grounded, combo_attack, PlayerMode::Attack2)
        .rules_from(&grounded, plain_attack, PlayerMode::Attack1)
        .build()
}

impl Actor for PlayerCharacter {
    fn id(&self) -> ActorId {
        self.id
    }

    fn name(&self) -> &'static str {
        self.body.profile.name
    }

    fn control(&self) -> Control {
        Control::Player
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
        if self.is_alive() {
            self.machine.update(&mut self.body, dt);
        }
    }

    fn draw(&self, painter: &mut dyn Painter, camera: &Camera2D) {
        self.machine.draw(&self.body, painter, camera);
    }

    fn handle_event(&mut self, event: &InputEvent) {
        self.body.keys.apply(event);
        self.machine
            .handle_event(&mut self.body, &ActorEvent::Input(*event));
    }

    fn bounding_box(&self) -> Aabb {
        Aabb::from_half_extent(self.body.position, self.body.profile.body_half)
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
    }

    fn vitals(&self) -> Vitals {
        self.body.vitals
    }

    fn is_alive(&self) -> bool {
        !self.body.vitals.is_depleted()
    }

    fn halt(&mut self) {
        self.body.keys.clear();
        if self.mode() != PlayerMode::Idle {
            self.machine
                .reset_to(&mut self.body, PlayerMode::Idle, &Cue::Halt.into());
        }
    }
}
