use std::time::{Duration, Instant};

/// Rolling frame-rate average, refreshed once per second.
pub struct FpsCounter {
    last_update: Instant,
    frames: u32,
    accumulated: Duration,
    pub current_fps: f32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_update: Instant::now(),
            frames: 0,
            accumulated: Duration::ZERO,
            current_fps: 0.0,
        }
    }

    /// Counts one frame. Returns the new average when a full second has
    /// accumulated, `None` otherwise.
    pub fn update(&mut self) -> Option<f32> {
        self.frames += 1;
        let now = Instant::now();
        self.accumulated += now - self.last_update;
        self.last_update = now;

        if self.accumulated.as_secs_f32() >= 1.0 {
            self.current_fps = self.frames as f32 / self.accumulated.as_secs_f32();
            self.accumulated = Duration::ZERO;
            self.frames = 0;
            return Some(self.current_fps);
        }

        None
    }
}
