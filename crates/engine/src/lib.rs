//! Engine half of Tidewalk: geometry, the state-machine engine, the tile
//! world, collision blocks and their editor, plus the window/loop/renderer
//! collaborators the game drives through narrow traits.

pub mod app;
pub mod blocks;
pub mod collision;
pub mod fsm;
pub mod geometry;
pub mod paths;
pub mod persist;
pub mod tiles;

pub use app::{
    run_app, AppError, Camera2D, InputEvent, InputSnapshot, Key, LoopConfig, MouseButton, Painter,
    Renderer, Rgba, Scene, SceneCommand, SceneKey, SpriteFrame, SLOW_FRAME_ENV_VAR,
};
pub use geometry::{Aabb, Vec2};
pub use paths::{resolve_app_paths, AppPaths, StartupError, ROOT_ENV_VAR};
pub use persist::PersistError;
