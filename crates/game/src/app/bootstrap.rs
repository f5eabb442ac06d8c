use engine::{resolve_app_paths, LoopConfig, Scene, StartupError, Vec2};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{config_path, GameConfig};
use super::gameplay::{self, PlaySettings};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) title: Box<dyn Scene>,
    pub(crate) play: Box<dyn Scene>,
}

pub(crate) fn build_app() -> Result<AppWiring, StartupError> {
    init_tracing();
    info!("=== Tidewalk Startup ===");

    let paths = resolve_app_paths()?;
    let config_file = config_path(&paths.config_dir);
    let game = GameConfig::load_or_default(&config_file);
    info!(
        root = %paths.root.display(),
        config = %config_file.display(),
        spawn_count = game.spawns.len(),
        "game_config_resolved"
    );

    let settings = PlaySettings {
        collision_data: paths.root.join(&game.collision_data),
        tile_map: game.tile_map.as_ref().map(|path| paths.root.join(path)),
        background: game.background.clone(),
        spawns: game.spawns.clone(),
        viewport: Vec2::new(game.window_width as f32, game.window_height as f32),
    };
    let (title, play) = gameplay::build_scenes(settings);

    let config = LoopConfig {
        window_title: game.window_title,
        window_width: game.window_width,
        window_height: game.window_height,
        assets_dir: paths.assets_dir.clone(),
        target_tps: game.target_tps,
        ..LoopConfig::default()
    };

    Ok(AppWiring {
        config,
        title,
        play,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
