mod camera;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use camera::Camera2D;
pub use input::{InputEvent, Key, MouseButton};
pub use loop_runner::{run_app, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{
    screen_rect_to_pixels, screen_to_pixel, Painter, PixelRect, Renderer, Rgba, SpriteFrame,
};
pub use scene::{InputSnapshot, Scene, SceneCommand, SceneKey};
