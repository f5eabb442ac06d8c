//! Per-species tunables. Every monster runs the same states; the table
//! below is what tells a Gnome from a Panda.

use crate::app::gameplay::actor::{ActiveFrames, Clip};

use super::states::MonsterMode;

const SMALL_CELL: u32 = 192;
const LARGE_CELL: u32 = 256;

/// Movement pattern of the locomotion state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Roam {
    /// Straight line along ±x.
    Patrol { speed: f32 },
    /// One of eight compass directions, diagonals slowed by 1.414.
    Wander { speed: f32 },
    /// Orbit around the position held when the state was entered.
    Circle { radius: f32, angular_speed: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Locomotion {
    pub(crate) roam: Roam,
    pub(crate) clip: Clip,
    pub(crate) duration: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AttackSpec {
    pub(crate) clip: Clip,
    pub(crate) duration: f32,
    pub(crate) window: ActiveFrames,
    pub(crate) reach: f32,
    pub(crate) height: f32,
    pub(crate) cooldown: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct GuardSpec {
    pub(crate) clip: Clip,
    pub(crate) duration: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Awareness {
    /// Notices the target whenever it is within `detect_radius`.
    Always { detect_radius: f32 },
    /// Notices only its attacker, for `alert_seconds` after each hit.
    WhenProvoked { alert_seconds: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Senses {
    pub(crate) attack_radius: f32,
    pub(crate) chase_speed: f32,
    pub(crate) chase_clip: Clip,
    pub(crate) awareness: Awareness,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Species {
    pub(crate) name: &'static str,
    pub(crate) cell: u32,
    pub(crate) body_half: f32,
    pub(crate) max_hp: u32,
    pub(crate) attack_power: u32,
    pub(crate) idle: Clip,
    pub(crate) idle_dwell: f32,
    pub(crate) locomotion: Locomotion,
    pub(crate) attack: Option<AttackSpec>,
    pub(crate) guard: Option<GuardSpec>,
    pub(crate) senses: Option<Senses>,
    /// Candidates drawn when the idle dwell runs out.
    pub(crate) after_idle: &'static [MonsterMode],
    /// Candidates drawn when a locomotion leg ends.
    pub(crate) after_roam: &'static [MonsterMode],
    pub(crate) after_guard: &'static [MonsterMode],
}

impl Species {
    pub(crate) fn alert_seconds(&self) -> Option<f32> {
        match self.senses?.awareness {
            Awareness::WhenProvoked { alert_seconds } => Some(alert_seconds),
            Awareness::Always { .. } => None,
        }
    }
}

pub(crate) static GNOME: Species = Species {
    name: "gnome",
    cell: SMALL_CELL,
    body_half: 45.0,
    max_hp: 100,
    attack_power: 15,
    idle: Clip::new("gnome/idle", 8, 7.0),
    idle_dwell: 1.0,
    locomotion: Locomotion {
        roam: Roam::Wander { speed: 200.0 },
        clip: Clip::new("gnome/run", 6, 9.0),
        duration: 2.0,
    },
    attack: Some(AttackSpec {
        clip: Clip::new("gnome/attack", 6, 8.0),
        duration: 0.75,
        window: ActiveFrames::new(3, 4),
        reach: 70.0,
        height: 40.0,
        cooldown: 2.0,
    }),
    guard: None,
    senses: Some(Senses {
        attack_radius: 100.0,
        chase_speed: 250.0,
        chase_clip: Clip::new("gnome/run", 6, 9.0),
        awareness: Awareness::Always {
            detect_radius: 300.0,
        },
    }),
    after_idle: &[MonsterMode::Roam],
    after_roam: &[MonsterMode::Idle],
    after_guard: &[MonsterMode::Idle],
};

pub(crate) static PADDLEFISH: Species = Species {
    name: "paddlefish",
    cell: SMALL_CELL,
    body_half: 40.0,
    max_hp: 80,
    attack_power: 12,
    idle: Clip::new("paddlefish/idle", 8, 6.0),
    idle_dwell: 2.0,
    locomotion: Locomotion {
        roam: Roam::Patrol { speed: 150.0 },
        clip: Clip::new("paddlefish/run", 6, 8.0),
        duration: 3.0,
    },
    attack: Some(AttackSpec {
        clip: Clip::new("paddlefish/attack", 6, 10.0),
        duration: 1.5,
        window: ActiveFrames::new(2, 4),
        reach: 65.0,
        height: 35.0,
        cooldown: 1.0,
    }),
    guard: None,
    senses: Some(Senses {
        attack_radius: 90.0,
        chase_speed: 200.0,
        chase_clip: Clip::new("paddlefish/run", 6, 8.0),
        awareness: Awareness::WhenProvoked { alert_seconds: 3.0 },
    }),
    after_idle: &[MonsterMode::Roam, MonsterMode::Attack],
    after_roam: &[MonsterMode::Idle, MonsterMode::Attack],
    after_guard: &[MonsterMode::Idle],
};

pub(crate) static PANDA: Species = Species {
    name: "panda",
    cell: LARGE_CELL,
    body_half: 35.0,
    max_hp: 120,
    attack_power: 20,
    idle: Clip::new("panda/idle", 6, 5.0),
    idle_dwell: 1.5,
    locomotion: Locomotion {
        roam: Roam::Circle {
            radius: 100.0,
            angular_speed: 2.0,
        },
        clip: Clip::new("panda/run", 8, 10.0),
        duration: 5.0,
    },
    attack: Some(AttackSpec {
        clip: Clip::new("panda/attack", 13, 10.0),
        duration: 1.5,
        window: ActiveFrames::new(6, 9),
        reach: 60.0,
        height: 45.0,
        cooldown: 1.0,
    }),
    guard: Some(GuardSpec {
        clip: Clip::new("panda/guard", 4, 5.0),
        duration: 2.0,
    }),
    senses: Some(Senses {
        attack_radius: 90.0,
        chase_speed: 180.0,
        chase_clip: Clip::new("panda/run", 8, 10.0),
        awareness: Awareness::WhenProvoked { alert_seconds: 4.0 },
    }),
    after_idle: &[MonsterMode::Roam, MonsterMode::Attack, MonsterMode::Guard],
    after_roam: &[MonsterMode::Idle, MonsterMode::Attack, MonsterMode::Guard],
    after_guard: &[MonsterMode::Idle, MonsterMode::Roam, MonsterMode::Attack],
};

pub(crate) static PATROLLER: Species = Species {
    name: "patroller",
    cell: SMALL_CELL,
    body_half: 40.0,
    max_hp: 60,
    attack_power: 0,
    idle: Clip::new("patroller/idle", 8, 6.0),
    idle_dwell: 2.0,
    locomotion: Locomotion {
        roam: Roam::Patrol { speed: 150.0 },
        clip: Clip::new("patroller/patrol", 6, 8.0),
        duration: 3.0,
    },
    attack: None,
    guard: None,
    senses: None,
    after_idle: &[MonsterMode::Roam],
    after_roam: &[MonsterMode::Idle],
    after_guard: &[MonsterMode::Idle],
};

pub(crate) static ORBITER: Species = Species {
    name: "orbiter",
    cell: SMALL_CELL,
    body_half: 40.0,
    max_hp: 60,
    attack_power: 0,
    idle: Clip::new("orbiter/idle", 6, 5.0),
    idle_dwell: 1.5,
    locomotion: Locomotion {
        roam: Roam::Circle {
            radius: 100.0,
            angular_speed: 2.0,
        },
        clip: Clip::new("orbiter/circle", 8, 10.0),
        duration: 5.0,
    },
    attack: None,
    guard: None,
    senses: None,
    after_idle: &[MonsterMode::Roam],
    after_roam: &[MonsterMode::Idle],
    after_guard: &[MonsterMode::Idle],
};

pub(crate) static WANDERER: Species = Species {
    name: "wanderer",
    cell: SMALL_CELL,
    body_half: 40.0,
    max_hp: 60,
    attack_power: 0,
    idle: Clip::new("wanderer/idle", 8, 7.0),
    idle_dwell: 1.0,
    locomotion: Locomotion {
        roam: Roam::Wander { speed: 200.0 },
        clip: Clip::new("wanderer/run", 6, 9.0),
        duration: 2.0,
    },
    attack: None,
    guard: None,
    senses: None,
    after_idle: &[MonsterMode::Roam],
    after_roam: &[MonsterMode::Idle],
    after_guard: &[MonsterMode::Idle],
};
