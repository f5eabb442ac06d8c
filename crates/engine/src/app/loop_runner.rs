use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton as WinitMouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowBuilder};

use crate::geometry::Vec2;

use super::metrics::LoopMetrics;
use super::scene::{SceneMachine, TickOutcome};
use super::{InputEvent, InputSnapshot, Key, MouseButton, Renderer, Scene, SceneKey};

pub const SLOW_FRAME_ENV_VAR: &str = "TIDEWALK_SLOW_FRAME_MS";

const FALLBACK_FRAME_DELTA: Duration = Duration::from_millis(250);
const FALLBACK_METRICS_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Sprite sheets resolve to `<assets_dir>/sprites/<key>.png`.
    pub assets_dir: PathBuf,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub simulated_slow_frame_ms: u64,
    pub max_render_fps: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Tidewalk".to_string(),
            window_width: 800,
            window_height: 600,
            assets_dir: PathBuf::from("assets"),
            target_tps: 60,
            max_frame_delta: FALLBACK_FRAME_DELTA,
            max_ticks_per_frame: 5,
            metrics_log_interval: FALLBACK_METRICS_INTERVAL,
            simulated_slow_frame_ms: 0,
            max_render_fps: Some(120),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens the window and drives `title` then `play` at a fixed tick rate
/// until the window closes or a scene asks to quit.
pub fn run_app(
    config: LoopConfig,
    title: Box<dyn Scene>,
    play: Box<dyn Scene>,
) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let renderer = Renderer::new(Arc::clone(&window), config.assets_dir.clone())
        .map_err(AppError::CreateRenderer)?;
    info!(assets_dir = %config.assets_dir.display(), "renderer_ready");

    event_loop.set_control_flow(ControlFlow::Poll);

    let scenes = SceneMachine::new(title, play, SceneKey::Title);
    let mut runtime = Runtime::new(&config, window, renderer, scenes);

    event_loop
        .run(move |event, window_target| {
            let flow = match event {
                Event::WindowEvent { window_id, event } if window_id == runtime.window.id() => {
                    runtime.window_event(event)
                }
                Event::AboutToWait => {
                    runtime.window.request_redraw();
                    Flow::Continue
                }
                Event::LoopExiting => {
                    runtime.scenes.shutdown_all();
                    info!("shutdown");
                    Flow::Continue
                }
                _ => Flow::Continue,
            };
            if flow == Flow::Exit {
                window_target.exit();
            }
        })
        .map_err(AppError::EventLoopRun)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

struct Runtime {
    window: Arc<Window>,
    renderer: Renderer,
    scenes: SceneMachine,
    input: InputCollector,
    pacer: TickPacer,
    limiter: PresentLimiter,
    metrics: LoopMetrics,
    slow_frame: Duration,
    base_title: String,
    shown_title: Option<String>,
}

impl Runtime {
    fn new(
        config: &LoopConfig,
        window: Arc<Window>,
        renderer: Renderer,
        mut scenes: SceneMachine,
    ) -> Self {
        let size = window.inner_size();
        let pacer = TickPacer::new(config, Instant::now());
        let limiter = PresentLimiter::new(config.max_render_fps);
        let metrics_interval = non_zero_or(config.metrics_log_interval, FALLBACK_METRICS_INTERVAL);
        let slow_frame = slow_frame_delay(config.simulated_slow_frame_ms);
        info!(
            target_tps = config.target_tps.max(1),
            max_frame_delta_ms = pacer.max_frame_delta.as_millis() as u64,
            max_ticks_per_frame = pacer.max_ticks,
            metrics_log_interval_ms = metrics_interval.as_millis() as u64,
            slow_frame_delay_ms = slow_frame.as_millis() as u64,
            render_fps_cap = ?limiter.fps_cap(),
            "loop_config"
        );
        scenes.load_active();

        Self {
            window,
            renderer,
            scenes,
            input: InputCollector::new(size.width, size.height),
            pacer,
            limiter,
            metrics: LoopMetrics::new(metrics_interval),
            slow_frame,
            base_title: config.window_title.clone(),
            shown_title: None,
        }
    }

    fn window_event(&mut self, event: WindowEvent) -> Flow {
        match event {
            WindowEvent::CloseRequested => {
                self.input.mark_quit_requested();
                info!(reason = "window_close", "shutdown_requested");
                Flow::Exit
            }
            WindowEvent::Resized(size) => {
                self.input.set_window_size(size.width, size.height);
                match self.renderer.resize(size.width, size.height) {
                    Ok(()) => Flow::Continue,
                    Err(error) => {
                        warn!(error = %error, "renderer_resize_failed");
                        Flow::Exit
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input
                    .handle_cursor_moved(position.x as f32, position.y as f32);
                Flow::Continue
            }
            WindowEvent::CursorLeft { .. } => {
                self.input.clear_cursor_position();
                Flow::Continue
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.input.handle_mouse_input(button, state);
                Flow::Continue
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if !event.repeat {
                    self.input.handle_key(event.physical_key, event.state);
                }
                if self.input.quit_requested {
                    info!(reason = "escape_key", "shutdown_requested");
                    Flow::Exit
                } else {
                    Flow::Continue
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => Flow::Continue,
        }
    }

    fn redraw(&mut self) -> Flow {
        if !self.slow_frame.is_zero() {
            thread::sleep(self.slow_frame);
        }

        let now = Instant::now();
        let budget = self.pacer.advance(now);
        for _ in 0..budget.ticks {
            let snapshot = self.input.snapshot_for_tick();
            self.metrics.tick();
            if self.scenes.tick(self.pacer.dt_seconds(), &snapshot) == TickOutcome::Quit {
                info!(reason = "scene_request", "shutdown_requested");
                return Flow::Exit;
            }
        }
        if !budget.dropped.is_zero() {
            warn!(
                dropped_backlog_ms = budget.dropped.as_millis() as u64,
                max_ticks_per_frame = self.pacer.max_ticks,
                "sim_clamp_triggered"
            );
        }

        self.limiter.wait();
        self.renderer.begin_frame();
        self.scenes.render_active(&mut self.renderer);
        if let Err(error) = self.renderer.present() {
            warn!(error = %error, "renderer_draw_failed");
            return Flow::Exit;
        }
        self.limiter.presented(Instant::now());

        self.refresh_title();
        self.metrics.frame(budget.frame_time);
        if let Some(snapshot) = self.metrics.poll(now) {
            info!(
                fps = snapshot.fps,
                tps = snapshot.tps,
                frame_time_ms = snapshot.frame_time_ms,
                scene = ?self.scenes.active_scene(),
                "loop_metrics"
            );
        }
        Flow::Continue
    }

    fn refresh_title(&mut self) {
        let title = self.scenes.debug_title_active();
        if title != self.shown_title {
            self.window
                .set_title(title.as_deref().unwrap_or(&self.base_title));
            self.shown_title = title;
        }
    }
}

/// Buffers window events between fixed ticks. Pointer positions are
/// converted to bottom-left origin screen coordinates.
#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    pending_events: Vec<InputEvent>,
    cursor_position: Option<Vec2>,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn handle_key(&mut self, physical_key: PhysicalKey, state: ElementState) {
        let Some(key) = map_physical_key(physical_key) else {
            return;
        };
        if key == Key::Escape && state == ElementState::Pressed {
            self.mark_quit_requested();
        }
        self.pending_events.push(match state {
            ElementState::Pressed => InputEvent::KeyDown(key),
            ElementState::Released => InputEvent::KeyUp(key),
        });
    }

    fn handle_cursor_moved(&mut self, x_px: f32, y_px: f32) {
        let position = Vec2::new(x_px, self.window_height as f32 - y_px);
        self.cursor_position = Some(position);
        self.pending_events.push(InputEvent::MouseMotion { position });
    }

    fn clear_cursor_position(&mut self) {
        self.cursor_position = None;
    }

    fn handle_mouse_input(&mut self, button: WinitMouseButton, state: ElementState) {
        let button = match button {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Right => MouseButton::Right,
            _ => return,
        };
        let Some(position) = self.cursor_position else {
            return;
        };
        self.pending_events.push(match state {
            ElementState::Pressed => InputEvent::MouseDown { button, position },
            ElementState::Released => InputEvent::MouseUp { button, position },
        });
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        InputSnapshot::new(
            self.quit_requested,
            std::mem::take(&mut self.pending_events),
            self.window_width,
            self.window_height,
        )
    }
}

fn map_physical_key(physical_key: PhysicalKey) -> Option<Key> {
    let PhysicalKey::Code(code) = physical_key else {
        return None;
    };
    let key = match code {
        KeyCode::ArrowLeft => Key::Left,
        KeyCode::ArrowRight => Key::Right,
        KeyCode::ArrowUp => Key::Up,
        KeyCode::ArrowDown => Key::Down,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyF => Key::F,
        KeyCode::Digit0 | KeyCode::Numpad0 => Key::Digit0,
        KeyCode::Digit7 | KeyCode::Numpad7 => Key::Digit7,
        KeyCode::Digit8 | KeyCode::Numpad8 => Key::Digit8,
        KeyCode::Digit9 | KeyCode::Numpad9 => Key::Digit9,
        KeyCode::Delete => Key::Delete,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Space => Key::Space,
        KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,
        KeyCode::Escape => Key::Escape,
        _ => return None,
    };
    Some(key)
}

/// Fixed-step accumulator. Frame time is clamped before it is banked, and a
/// frame never runs more than `max_ticks` ticks; leftover backlog is dropped.
#[derive(Debug)]
struct TickPacer {
    fixed_dt: Duration,
    max_frame_delta: Duration,
    max_ticks: u32,
    backlog: Duration,
    last_frame: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameBudget {
    ticks: u32,
    frame_time: Duration,
    dropped: Duration,
}

impl TickPacer {
    fn new(config: &LoopConfig, now: Instant) -> Self {
        Self {
            fixed_dt: Duration::from_secs_f64(1.0 / f64::from(config.target_tps.max(1))),
            max_frame_delta: non_zero_or(config.max_frame_delta, FALLBACK_FRAME_DELTA),
            max_ticks: config.max_ticks_per_frame.max(1),
            backlog: Duration::ZERO,
            last_frame: now,
        }
    }

    fn dt_seconds(&self) -> f32 {
        self.fixed_dt.as_secs_f32()
    }

    fn advance(&mut self, now: Instant) -> FrameBudget {
        let frame_time = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        self.backlog += frame_time.min(self.max_frame_delta);

        let mut ticks = 0;
        while self.backlog >= self.fixed_dt && ticks < self.max_ticks {
            self.backlog -= self.fixed_dt;
            ticks += 1;
        }
        let dropped = if self.backlog >= self.fixed_dt {
            std::mem::take(&mut self.backlog)
        } else {
            Duration::ZERO
        };

        FrameBudget {
            ticks,
            frame_time,
            dropped,
        }
    }
}

/// Sleeps before presenting so frames are at least `1 / fps` apart.
#[derive(Debug)]
struct PresentLimiter {
    min_interval: Option<Duration>,
    last_present: Instant,
}

impl PresentLimiter {
    fn new(max_fps: Option<u32>) -> Self {
        Self {
            min_interval: max_fps
                .filter(|fps| *fps > 0)
                .map(|fps| Duration::from_secs_f64(1.0 / f64::from(fps))),
            last_present: Instant::now(),
        }
    }

    fn fps_cap(&self) -> Option<u32> {
        self.min_interval
            .map(|interval| (1.0 / interval.as_secs_f64()).round() as u32)
    }

    fn remaining(&self, now: Instant) -> Duration {
        self.min_interval.map_or(Duration::ZERO, |interval| {
            interval.saturating_sub(now.saturating_duration_since(self.last_present))
        })
    }

    fn wait(&self) {
        let remaining = self.remaining(Instant::now());
        if !remaining.is_zero() {
            thread::sleep(remaining);
        }
    }

    fn presented(&mut self, now: Instant) {
        self.last_present = now;
    }
}

fn non_zero_or(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

/// `TIDEWALK_SLOW_FRAME_MS` wins over the configured delay when it parses.
fn slow_frame_delay(configured_ms: u64) -> Duration {
    let millis = match env::var(SLOW_FRAME_ENV_VAR) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(env_var = SLOW_FRAME_ENV_VAR, value = %raw, "slow_frame_env_invalid");
            configured_ms
        }),
        Err(_) => configured_ms,
    };
    Duration::from_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pacer(target_tps: u32, max_ticks_per_frame: u32, start: Instant) -> TickPacer {
        let config = LoopConfig {
            target_tps,
            max_ticks_per_frame,
            ..LoopConfig::default()
        };
        TickPacer::new(&config, start)
    }

    #[test]
    fn pacer_banks_remainder_between_frames() {
        let start = Instant::now();
        let mut pacer = pacer(50, 5, start);

        let first = pacer.advance(start + Duration::from_millis(50));
        assert_eq!(first.ticks, 2);
        assert_eq!(first.dropped, Duration::ZERO);

        let second = pacer.advance(start + Duration::from_millis(60));
        assert_eq!(second.ticks, 1);
        assert_eq!(second.frame_time, Duration::from_millis(10));
    }

    #[test]
    fn pacer_clamps_long_frames_and_drops_backlog() {
        let start = Instant::now();
        let mut pacer = pacer(50, 3, start);

        let budget = pacer.advance(start + Duration::from_millis(900));
        assert_eq!(budget.ticks, 3);
        assert_eq!(budget.dropped, Duration::from_millis(190));
        assert_eq!(budget.frame_time, Duration::from_millis(900));
        assert_eq!(pacer.backlog, Duration::ZERO);
    }

    #[test]
    fn zero_config_values_fall_back() {
        let config = LoopConfig {
            target_tps: 0,
            max_ticks_per_frame: 0,
            max_frame_delta: Duration::ZERO,
            ..LoopConfig::default()
        };
        let pacer = TickPacer::new(&config, Instant::now());
        assert_eq!(pacer.fixed_dt, Duration::from_secs(1));
        assert_eq!(pacer.max_ticks, 1);
        assert_eq!(pacer.max_frame_delta, FALLBACK_FRAME_DELTA);
    }

    #[test]
    fn limiter_waits_out_the_frame_interval() {
        let mut limiter = PresentLimiter::new(Some(50));
        let start = Instant::now();
        limiter.presented(start);

        assert_eq!(limiter.fps_cap(), Some(50));
        assert_eq!(
            limiter.remaining(start + Duration::from_millis(5)),
            Duration::from_millis(15)
        );
        assert_eq!(
            limiter.remaining(start + Duration::from_millis(30)),
            Duration::ZERO
        );
        assert_eq!(PresentLimiter::new(Some(0)).fps_cap(), None);
    }

    #[test]
    fn key_events_are_queued_in_order_and_drained_per_tick() {
        let mut input = InputCollector::new(800, 600);
        input.handle_key(PhysicalKey::Code(KeyCode::ArrowRight), ElementState::Pressed);
        input.handle_key(PhysicalKey::Code(KeyCode::KeyA), ElementState::Pressed);
        input.handle_key(PhysicalKey::Code(KeyCode::ArrowRight), ElementState::Released);
        input.handle_key(PhysicalKey::Code(KeyCode::KeyQ), ElementState::Pressed);

        let first = input.snapshot_for_tick();
        let second = input.snapshot_for_tick();

        assert_eq!(
            first.events(),
            &[
                InputEvent::KeyDown(Key::Right),
                InputEvent::KeyDown(Key::A),
                InputEvent::KeyUp(Key::Right),
            ]
        );
        assert!(second.events().is_empty());
    }

    #[test]
    fn escape_requests_quit() {
        let mut input = InputCollector::new(800, 600);
        input.handle_key(PhysicalKey::Code(KeyCode::Escape), ElementState::Pressed);
        assert!(input.snapshot_for_tick().quit_requested());
    }

    #[test]
    fn pointer_events_use_bottom_left_origin() {
        let mut input = InputCollector::new(800, 600);
        input.handle_cursor_moved(100.0, 200.0);
        input.handle_mouse_input(WinitMouseButton::Left, ElementState::Pressed);
        input.handle_mouse_input(WinitMouseButton::Middle, ElementState::Pressed);

        let snapshot = input.snapshot_for_tick();
        let position = Vec2::new(100.0, 400.0);
        assert_eq!(
            snapshot.events(),
            &[
                InputEvent::MouseMotion { position },
                InputEvent::MouseDown {
                    button: MouseButton::Left,
                    position
                },
            ]
        );
        assert_eq!(snapshot.window_size(), (800, 600));
    }

    #[test]
    fn clicks_without_cursor_are_ignored() {
        let mut input = InputCollector::new(800, 600);
        input.handle_mouse_input(WinitMouseButton::Right, ElementState::Pressed);
        assert!(input.snapshot_for_tick().events().is_empty());
    }
}
