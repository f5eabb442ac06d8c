use std::path::PathBuf;

use engine::{InputEvent, InputSnapshot, Key, Painter, Scene, SceneCommand, Vec2};
use tracing::{error, info};

use crate::app::config::{BackgroundLayer, SpawnPoint};

use super::level::load_tile_map;
use super::world::World;

/// Inputs the play scene needs to (re)build its world on load.
#[derive(Debug, Clone)]
pub(crate) struct PlaySettings {
    pub(crate) collision_data: PathBuf,
    pub(crate) tile_map: Option<PathBuf>,
    pub(crate) background: Option<BackgroundLayer>,
    pub(crate) spawns: Vec<SpawnPoint>,
    pub(crate) viewport: Vec2,
}

pub(crate) struct PlayScene {
    settings: PlaySettings,
    world: Option<World>,
}

impl PlayScene {
    pub(crate) fn new(settings: PlaySettings) -> Self {
        Self {
            settings,
            world: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    fn build_world(&self) -> World {
        let tiles = load_tile_map(self.settings.tile_map.as_deref());
        let mut world = World::new(tiles, self.settings.viewport);
        world.set_background(self.settings.background.clone());
        for spawn in &self.settings.spawns {
            if let Err(err) = world.spawn(spawn) {
                error!(kind = ?spawn.kind, error = %err, "spawn_failed");
            }
        }
        world.load_blocks(&self.settings.collision_data);
        world
    }

    fn route_event(&self, world: &mut World, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(Key::Digit0) => {
                let visible = world.toggle_collision_boxes();
                info!(visible, "collision_boxes_toggled");
            }
            InputEvent::KeyDown(Key::Digit9) => {
                world.toggle_editor();
            }
            InputEvent::KeyDown(Key::Digit8) => world.save_blocks(&self.settings.collision_data),
            InputEvent::KeyDown(Key::Digit7) => world.load_blocks(&self.settings.collision_data),
            _ if world.editor_active() => world.editor_input(event),
            InputEvent::KeyDown(Key::F) => {
                world.swap_character();
            }
            _ => world.dispatch_input(event),
        }
    }
}

impl Scene for PlayScene {
    fn load(&mut self) {
        let world = self.build_world();
        info!(
            actors = world.actor_count(),
            blocks = world.blocks().len(),
            "play_world_ready"
        );
        self.world = Some(world);
    }

    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        let Some(mut world) = self.world.take() else {
            return SceneCommand::None;
        };

        let (width, height) = input.window_size();
        if width > 0 && height > 0 {
            world.set_viewport(width as f32, height as f32);
        }
        for event in input.events() {
            self.route_event(&mut world, event);
        }

        if world.editor_active() {
            world.update_camera(fixed_dt_seconds);
        } else {
            world.tick(fixed_dt_seconds);
        }
        self.world = Some(world);
        SceneCommand::None
    }

    fn render(&self, painter: &mut dyn Painter) {
        if let Some(world) = &self.world {
            world.draw(painter);
        }
    }

    fn unload(&mut self) {
        self.world = None;
    }

    fn debug_title(&self) -> Option<String> {
        let world = self.world.as_ref()?;
        if world.editor_active() {
            let selected = world
                .editor()
                .selected()
                .map_or_else(|| "none".to_string(), |index| index.to_string());
            return Some(format!(
                "Editor | blocks {} | selected {}",
                world.blocks().len(),
                selected
            ));
        }
        let status = match world.active_actor() {
            Some(actor) => {
                let vitals = actor.vitals();
                format!(
                    "{} {} hp {}/{}",
                    actor.name(),
                    actor.mode_name(),
                    vitals.hp,
                    vitals.max_hp
                )
            }
            None => "no character".to_string(),
        };
        Some(format!("{status} | actors {}", world.actor_count()))
    }
}

#[cfg(test)]
mod tests {
    use engine::MouseButton;
    use tempfile::TempDir;

    use super::*;
    use crate::app::config::GameConfig;

    fn scene(temp: &TempDir) -> PlayScene {
        let mut scene = PlayScene::new(PlaySettings {
            collision_data: temp.path().join("collision_data.json"),
            tile_map: None,
            background: None,
            spawns: GameConfig::default().spawns,
            viewport: Vec2::new(800.0, 600.0),
        });
        scene.load();
        scene
    }

    fn press(key: Key) -> InputSnapshot {
        InputSnapshot::new(false, vec![InputEvent::KeyDown(key)], 800, 600)
    }

    #[test]
    fn load_spawns_configured_actors() {
        let temp = TempDir::new().expect("temp");
        let scene = scene(&temp);
        let world = scene.world().expect("world");
        assert_eq!(world.actor_count(), 8);
        assert_eq!(world.active_actor().map(|actor| actor.name()), Some("warrior"));
    }

    #[test]
    fn swap_key_changes_controlled_character() {
        let temp = TempDir::new().expect("temp");
        let mut scene = scene(&temp);
        scene.update(1.0 / 60.0, &press(Key::F));
        let world = scene.world().expect("world");
        assert_eq!(world.active_actor().map(|actor| actor.name()), Some("child"));
    }

    #[test]
    fn editor_freezes_simulation_and_saves_blocks() {
        let temp = TempDir::new().expect("temp");
        let mut scene = scene(&temp);
        scene.update(1.0 / 60.0, &press(Key::Digit9));
        let before = scene
            .world()
            .and_then(|world| world.active_actor())
            .map(|actor| actor.position());

        // Pointer coordinates are screen space; the camera is centered on
        // the warrior at (400, 300).
        let drag = InputSnapshot::new(
            false,
            vec![
                InputEvent::MouseDown {
                    button: MouseButton::Left,
                    position: Vec2::new(100.0, 100.0),
                },
                InputEvent::MouseMotion {
                    position: Vec2::new(160.0, 150.0),
                },
                InputEvent::MouseUp {
                    button: MouseButton::Left,
                    position: Vec2::new(160.0, 150.0),
                },
                InputEvent::KeyDown(Key::Right),
            ],
            800,
            600,
        );
        scene.update(1.0 / 60.0, &drag);
        scene.update(1.0 / 60.0, &press(Key::Digit8));

        let world = scene.world().expect("world");
        assert_eq!(world.blocks().len(), 1);
        assert_eq!(
            world.active_actor().map(|actor| actor.position()),
            before
        );
        assert!(temp.path().join("collision_data.json").is_file());
        assert!(scene.debug_title().is_some_and(|title| title.starts_with("Editor")));
    }
}
