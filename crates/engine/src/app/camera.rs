use crate::geometry::{Aabb, Vec2};

const DEFAULT_FOLLOW_RATE: f32 = 5.0;

/// Screen-space translation of the world. `position` is the world point
/// shown at the bottom-left corner of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
    pub viewport: Vec2,
    target: Vec2,
    follow_rate: f32,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl Camera2D {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            viewport: Vec2::new(viewport_width, viewport_height),
            target: Vec2::ZERO,
            follow_rate: DEFAULT_FOLLOW_RATE,
        }
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
    }

    /// Aims the camera so that `focus` ends up centered.
    pub fn follow(&mut self, focus: Vec2) {
        self.target = focus - self.viewport * 0.5;
    }

    /// Places the camera on its target immediately.
    pub fn snap_to_target(&mut self) {
        self.position = self.target;
    }

    /// Exponential smoothing toward the follow target, frame-rate independent.
    pub fn update(&mut self, dt: f32) {
        let t = 1.0 - 0.5_f32.powf(self.follow_rate * dt.max(0.0));
        self.position += (self.target - self.position) * t;
    }

    pub fn apply(&self, world: Vec2) -> Vec2 {
        world - self.position
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen + self.position
    }

    pub fn apply_rect(&self, rect: &Aabb) -> Aabb {
        rect.translated(Vec2::ZERO - self.position)
    }

    pub fn view_rect(&self) -> Aabb {
        Aabb::new(
            self.position.x,
            self.position.y,
            self.position.x + self.viewport.x,
            self.position.y + self.viewport.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_and_screen_to_world_are_inverse() {
        let mut camera = Camera2D::new(800.0, 600.0);
        camera.position = Vec2::new(120.0, -40.0);
        let world = Vec2::new(300.0, 250.0);
        let screen = camera.apply(world);
        assert_eq!(screen, Vec2::new(180.0, 290.0));
        assert_eq!(camera.screen_to_world(screen), world);
    }

    #[test]
    fn follow_converges_toward_centered_target() {
        let mut camera = Camera2D::new(800.0, 600.0);
        camera.follow(Vec2::new(1000.0, 500.0));

        camera.update(0.2);
        // One fifth of a second at rate 5 closes half the gap.
        assert!((camera.position.x - 300.0).abs() < 0.01);
        assert!((camera.position.y - 100.0).abs() < 0.01);

        for _ in 0..200 {
            camera.update(1.0 / 60.0);
        }
        assert!((camera.position.x - 600.0).abs() < 0.01);
        assert!((camera.position.y - 200.0).abs() < 0.01);
    }

    #[test]
    fn view_rect_spans_viewport() {
        let mut camera = Camera2D::new(800.0, 600.0);
        camera.follow(Vec2::new(400.0, 300.0));
        camera.snap_to_target();
        assert_eq!(camera.view_rect(), Aabb::new(0.0, 0.0, 800.0, 600.0));
    }
}
