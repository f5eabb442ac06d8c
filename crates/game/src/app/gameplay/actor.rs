use engine::{Aabb, Camera2D, InputEvent, Painter, SpriteFrame, Vec2};

/// Horizontal displacement applied to whoever takes a hit.
pub(crate) const KNOCKBACK_DISTANCE: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ActorId(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Control {
    Player,
    Ai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Facing {
    Left,
    Right,
}

impl Facing {
    pub(crate) fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// Facing implied by a horizontal direction; `None` for zero.
    pub(crate) fn from_x(x: f32) -> Option<Facing> {
        if x > 0.0 {
            Some(Facing::Right)
        } else if x < 0.0 {
            Some(Facing::Left)
        } else {
            None
        }
    }

    pub(crate) fn is_left(self) -> bool {
        self == Facing::Left
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Vitals {
    pub(crate) hp: u32,
    pub(crate) max_hp: u32,
}

impl Vitals {
    pub(crate) fn full(max_hp: u32) -> Self {
        Self { hp: max_hp, max_hp }
    }

    /// Subtracts `amount`, flooring at zero.
    pub(crate) fn apply_damage(&mut self, amount: u32) {
        self.hp = self.hp.saturating_sub(amount);
    }

    pub(crate) fn is_depleted(&self) -> bool {
        self.hp == 0
    }

    pub(crate) fn fraction(&self) -> f32 {
        if self.max_hp == 0 {
            0.0
        } else {
            self.hp as f32 / self.max_hp as f32
        }
    }
}

/// Push away from the attacker along x.
pub(crate) fn knockback_offset(x: f32, attacker_x: f32) -> f32 {
    if x > attacker_x {
        KNOCKBACK_DISTANCE
    } else {
        -KNOCKBACK_DISTANCE
    }
}

/// One animation strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Clip {
    pub(crate) sheet: &'static str,
    pub(crate) frames: u32,
    pub(crate) fps: f32,
}

impl Clip {
    pub(crate) const fn new(sheet: &'static str, frames: u32, fps: f32) -> Self {
        Self { sheet, frames, fps }
    }
}

/// Fractional frame counter advanced by `fps * dt`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct FrameClock {
    frame: f32,
}

impl FrameClock {
    pub(crate) fn reset(&mut self) {
        self.frame = 0.0;
    }

    pub(crate) fn index(&self) -> u32 {
        self.frame.max(0.0) as u32
    }

    pub(crate) fn advance_looping(&mut self, clip: &Clip, dt: f32) {
        if clip.frames == 0 {
            return;
        }
        self.frame = (self.frame + clip.fps * dt) % clip.frames as f32;
    }

    /// Advances without wrapping; the counter rests on the last frame.
    pub(crate) fn advance_clamped(&mut self, clip: &Clip, dt: f32) {
        let last = clip.frames.saturating_sub(1) as f32;
        self.frame = (self.frame + clip.fps * dt).min(last);
    }

    /// Advances and reports whether a full cycle has completed.
    pub(crate) fn advance_once(&mut self, clip: &Clip, dt: f32) -> bool {
        self.frame += clip.fps * dt;
        if self.frame >= clip.frames as f32 {
            self.frame = clip.frames.saturating_sub(1) as f32;
            return true;
        }
        false
    }
}

/// Damage region an attack state currently exposes. `reach` extends from
/// the actor's center toward its facing side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Strike {
    pub(crate) reach: f32,
    pub(crate) height: f32,
    pub(crate) power: u32,
}

impl Strike {
    pub(crate) fn hitbox(&self, position: Vec2, facing: Facing) -> Aabb {
        let far_x = position.x + facing.sign() * self.reach;
        Aabb::new(
            position.x,
            position.y - self.height * 0.5,
            far_x,
            position.y + self.height * 0.5,
        )
    }
}

/// Attack frame sub-range, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ActiveFrames {
    pub(crate) first: u32,
    pub(crate) last: u32,
}

impl ActiveFrames {
    pub(crate) const fn new(first: u32, last: u32) -> Self {
        Self { first, last }
    }

    pub(crate) fn contains(&self, frame: u32) -> bool {
        frame >= self.first && frame <= self.last
    }
}

pub(crate) fn draw_clip_frame(
    painter: &mut dyn Painter,
    camera: &Camera2D,
    clip: &Clip,
    cell: u32,
    index: u32,
    position: Vec2,
    facing: Facing,
) {
    let frame = SpriteFrame::new(clip.sheet, index.min(clip.frames.saturating_sub(1)), cell)
        .flipped(facing.is_left());
    painter.draw_frame(frame, camera.apply(position));
}

/// Everything the world, the combat resolver and the scene need from a
/// character or monster.
pub(crate) trait Actor {
    fn id(&self) -> ActorId;
    fn name(&self) -> &'static str;
    fn control(&self) -> Control;
    fn mode_name(&self) -> &'static str;

    fn position(&self) -> Vec2;
    fn set_position(&mut self, position: Vec2);

    fn update(&mut self, dt: f32);
    fn draw(&self, painter: &mut dyn Painter, camera: &Camera2D);
    fn handle_event(&mut self, event: &InputEvent);

    fn bounding_box(&self) -> Aabb;
    fn attack_bounding_box(&self) -> Option<Aabb>;
    fn current_attack_power(&self) -> u32;
    fn take_damage(&mut self, amount: u32, attacker_x: Option<f32>);

    fn vitals(&self) -> Vitals;
    fn is_alive(&self) -> bool;

    /// Actor this one is tracking, if any.
    fn target(&self) -> Option<ActorId> {
        None
    }
    fn set_target(&mut self, _target: Option<ActorId>) {}
    /// Latest position of the tracked actor, refreshed every tick.
    fn observe_target(&mut self, _position: Option<Vec2>) {}
    /// Notifies the actor that `attacker` just hit it.
    fn provoke(&mut self, _attacker: ActorId) {}
    /// Drops held input and returns to rest.
    fn halt(&mut self) {}

    fn is_player_controlled(&self) -> bool {
        self.control() == Control::Player
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vitals_floor_at_zero() {
        let mut vitals = Vitals::full(50);
        vitals.apply_damage(30);
        assert_eq!(vitals.hp, 20);
        vitals.apply_damage(30);
        assert_eq!(vitals.hp, 0);
        assert!(vitals.is_depleted());
    }

    #[test]
    fn knockback_pushes_away_from_attacker() {
        assert_eq!(knockback_offset(150.0, 100.0), 20.0);
        assert_eq!(knockback_offset(50.0, 100.0), -20.0);
    }

    #[test]
    fn strike_hitbox_extends_toward_facing() {
        let strike = Strike {
            reach: 70.0,
            height: 40.0,
            power: 15,
        };
        let position = Vec2::new(100.0, 100.0);
        assert_eq!(
            strike.hitbox(position, Facing::Right),
            Aabb::new(100.0, 80.0, 170.0, 120.0)
        );
        assert_eq!(
            strike.hitbox(position, Facing::Left),
            Aabb::new(30.0, 80.0, 100.0, 120.0)
        );
    }

    #[test]
    fn frame_clock_modes() {
        let clip = Clip::new("test", 6, 12.0);
        let mut clock = FrameClock::default();
        clock.advance_looping(&clip, 0.6);
        assert_eq!(clock.index(), 1);

        clock.reset();
        clock.advance_clamped(&clip, 10.0);
        assert_eq!(clock.index(), 5);

        clock.reset();
        assert!(!clock.advance_once(&clip, 0.4));
        assert!(clock.advance_once(&clip, 0.1));
        assert_eq!(clock.index(), 5);
    }
}
