use engine::{
    Aabb, InputEvent, InputSnapshot, Key, Painter, Rgba, Scene, SceneCommand, SceneKey,
    SpriteFrame, Vec2,
};

const TITLE_SHEET: &str = "ui/title";
const TITLE_CELL: u32 = 512;
const BACKDROP_COLOR: Rgba = [18, 42, 66, 255];

/// Splash screen; Space or Enter starts the game.
pub(crate) struct TitleScene {
    screen: Vec2,
}

impl TitleScene {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            screen: Vec2::new(width as f32, height as f32),
        }
    }
}

fn starts_game(event: &InputEvent) -> bool {
    event.is_key_down(Key::Space) || event.is_key_down(Key::Enter)
}

impl Scene for TitleScene {
    fn load(&mut self) {}

    fn update(&mut self, _fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        let (width, height) = input.window_size();
        if width > 0 && height > 0 {
            self.screen = Vec2::new(width as f32, height as f32);
        }
        if input.events().iter().any(starts_game) {
            return SceneCommand::SwitchTo(SceneKey::Play);
        }
        SceneCommand::None
    }

    fn render(&self, painter: &mut dyn Painter) {
        painter.fill_rect(Aabb::new(0.0, 0.0, self.screen.x, self.screen.y), BACKDROP_COLOR);
        painter.draw_frame(SpriteFrame::new(TITLE_SHEET, 0, TITLE_CELL), self.screen * 0.5);
    }

    fn unload(&mut self) {}

    fn debug_title(&self) -> Option<String> {
        Some("Press Space or Enter".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_or_enter_switches_to_play() {
        let mut title = TitleScene::new(800, 600);
        for key in [Key::Space, Key::Enter] {
            let input = InputSnapshot::empty().with_event(InputEvent::KeyDown(key));
            assert_eq!(title.update(0.016, &input), SceneCommand::SwitchTo(SceneKey::Play));
        }
        let other = InputSnapshot::empty().with_event(InputEvent::KeyDown(Key::A));
        assert_eq!(title.update(0.016, &other), SceneCommand::None);
    }
}
