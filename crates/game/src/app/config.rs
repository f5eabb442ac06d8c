use std::path::{Path, PathBuf};

use engine::persist::{read_json, PersistError};
use engine::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub(crate) const CONFIG_ENV_VAR: &str = "TIDEWALK_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "game.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum SpawnKind {
    Warrior,
    Child,
    Gnome,
    Paddlefish,
    Panda,
    Patroller,
    Orbiter,
    Wanderer,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub(crate) struct SpawnPoint {
    pub(crate) kind: SpawnKind,
    pub(crate) x: f32,
    pub(crate) y: f32,
}

impl SpawnPoint {
    const fn new(kind: SpawnKind, x: f32, y: f32) -> Self {
        Self { kind, x, y }
    }

    pub(crate) fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Image drawn behind the map, covering world space from the origin to its
/// own size. `sheet` is a sprite key under `assets/sprites`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct BackgroundLayer {
    pub(crate) sheet: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl BackgroundLayer {
    pub(crate) fn center(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) * 0.5
    }
}

/// Game-level settings. Every field has a default so a partial file works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct GameConfig {
    pub(crate) window_title: String,
    pub(crate) window_width: u32,
    pub(crate) window_height: u32,
    pub(crate) target_tps: u32,
    /// Relative to the project root.
    pub(crate) collision_data: PathBuf,
    /// Relative to the project root. The built-in island is used when unset.
    pub(crate) tile_map: Option<PathBuf>,
    pub(crate) background: Option<BackgroundLayer>,
    pub(crate) spawns: Vec<SpawnPoint>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_title: "Tidewalk".to_string(),
            window_width: 800,
            window_height: 600,
            target_tps: 60,
            collision_data: PathBuf::from("maps/collision_data.json"),
            tile_map: None,
            background: None,
            spawns: vec![
                SpawnPoint::new(SpawnKind::Warrior, 400.0, 300.0),
                SpawnPoint::new(SpawnKind::Child, 500.0, 300.0),
                SpawnPoint::new(SpawnKind::Gnome, 600.0, 400.0),
                SpawnPoint::new(SpawnKind::Paddlefish, 800.0, 400.0),
                SpawnPoint::new(SpawnKind::Panda, 1000.0, 400.0),
                SpawnPoint::new(SpawnKind::Patroller, 1200.0, 300.0),
                SpawnPoint::new(SpawnKind::Orbiter, 1400.0, 400.0),
                SpawnPoint::new(SpawnKind::Wanderer, 1600.0, 300.0),
            ],
        }
    }
}

impl GameConfig {
    /// Reads the config file. A missing file yields defaults; a malformed
    /// one is reported and also yields defaults.
    pub(crate) fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                info!(path = %path.display(), "game_config_loaded");
                config
            }
            Err(err) if err.is_not_found() => {
                info!(path = %path.display(), "game_config_missing_using_defaults");
                Self::default()
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "game_config_invalid_using_defaults");
                Self::default()
            }
        }
    }

    pub(crate) fn load(path: &Path) -> Result<Self, PersistError> {
        read_json(path)
    }
}

/// `TIDEWALK_CONFIG` when set, otherwise `game.json` in the config dir.
pub(crate) fn config_path(config_dir: &Path) -> PathBuf {
    std::env::var_os(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| config_dir.join(DEFAULT_CONFIG_FILE))
}
