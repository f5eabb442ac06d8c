use crate::app::gameplay::actor::{ActiveFrames, Clip};

/// Player characters are drawn from square 192px cells.
const PLAYER_CELL: u32 = 192;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AttackMove {
    pub(crate) clip: Clip,
    pub(crate) window: ActiveFrames,
    pub(crate) power_scale: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AttackSet {
    pub(crate) first: AttackMove,
    pub(crate) second: AttackMove,
    pub(crate) reach: f32,
    pub(crate) height: f32,
}

/// Tunables of one controllable character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PlayerProfile {
    pub(crate) name: &'static str,
    pub(crate) cell: u32,
    pub(crate) speed: f32,
    pub(crate) body_half: f32,
    pub(crate) max_hp: u32,
    pub(crate) attack_power: u32,
    pub(crate) idle: Clip,
    pub(crate) run: Clip,
    pub(crate) attacks: Option<AttackSet>,
}

impl PlayerProfile {
    pub(crate) fn scaled_power(&self, scale: f32) -> u32 {
        (self.attack_power as f32 * scale).round() as u32
    }
}

pub(crate) static WARRIOR: PlayerProfile = PlayerProfile {
    name: "warrior",
    cell: PLAYER_CELL,
    speed: 300.0,
    body_half: 40.0,
    max_hp: 100,
    attack_power: 25,
    idle: Clip::new("warrior/idle", 8, 8.0),
    run: Clip::new("warrior/run", 6, 10.0),
    attacks: Some(AttackSet {
        first: AttackMove {
            clip: Clip::new("warrior/attack1", 6, 12.0),
            window: ActiveFrames::new(1, 2),
            power_scale: 1.0,
        },
        second: AttackMove {
            clip: Clip::new("warrior/attack2", 6, 12.0),
            window: ActiveFrames::new(2, 3),
            power_scale: 1.5,
        },
        reach: 80.0,
        height: 60.0,
    }),
};

pub(crate) static CHILD: PlayerProfile = PlayerProfile {
    name: "child",
    cell: PLAYER_CELL,
    speed: 250.0,
    body_half: 40.0,
    max_hp: 100,
    attack_power: 0,
    idle: Clip::new("child/idle", 6, 8.0),
    run: Clip::new("child/run", 4, 8.0),
    attacks: None,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_attack_hits_harder() {
        let attacks = WARRIOR.attacks.expect("warrior attacks");
        assert_eq!(WARRIOR.scaled_power(attacks.first.power_scale), 25);
        assert_eq!(WARRIOR.scaled_power(attacks.second.power_scale), 38);
        assert!(CHILD.attacks.is_none());
    }
}
