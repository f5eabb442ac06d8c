use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
}

#[derive(Debug, Clone, Copy, Default)]
struct Counts {
    frames: u32,
    ticks: u32,
    frame_time: Duration,
}

/// Frame and tick counters averaged over a reporting window.
#[derive(Debug)]
pub(crate) struct LoopMetrics {
    window: Duration,
    window_start: Instant,
    counts: Counts,
}

impl LoopMetrics {
    pub(crate) fn new(window: Duration) -> Self {
        Self::from_instant(Instant::now(), window)
    }

    fn from_instant(window_start: Instant, window: Duration) -> Self {
        Self {
            window,
            window_start,
            counts: Counts::default(),
        }
    }

    pub(crate) fn frame(&mut self, frame_time: Duration) {
        self.counts.frames += 1;
        self.counts.frame_time += frame_time;
    }

    pub(crate) fn tick(&mut self) {
        self.counts.ticks += 1;
    }

    /// Closes the window once it has run its length, returning the averages
    /// and starting a fresh one at `now`.
    pub(crate) fn poll(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window {
            return None;
        }

        let counts = std::mem::take(&mut self.counts);
        self.window_start = now;

        let seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = if counts.frames == 0 {
            0.0
        } else {
            counts.frame_time.as_secs_f32() * 1000.0 / counts.frames as f32
        };
        Some(LoopMetricsSnapshot {
            fps: counts.frames as f32 / seconds,
            tps: counts.ticks as f32 / seconds,
            frame_time_ms,
        })
    }
}
