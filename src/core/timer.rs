/// Fixed rate timer - fires at specific Hz
#[derive(Debug, Clone, Copy)]
pub struct FixedHz {
    pub interval: f32,
    pub accumulator: f32,
}

impl FixedHz {
    /// Create timer that fires at given frequency
    pub fn new(hz: f32) -> Self {
        Self {
            interval: 1.0 / hz,
            accumulator: 0.0,
        }
    }

    /// Update with delta, returns true if should fire
    pub fn tick(&mut self, delta: f32) -> bool {
        self.accumulator += delta;

        if self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            true
        } else {
            false
        }
    }
}

/// Frames-per-second readout, refreshed once per second
#[derive(Debug, Clone, Copy)]
pub struct FpsCounter {
    timer: FixedHz,
    frames: u32,
    window: f32,
    fps: f32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            timer: FixedHz::new(1.0),
            frames: 0,
            window: 0.0,
            fps: 0.0,
        }
    }

    /// Count one frame; returns the new reading when it refreshes
    pub fn tick(&mut self, delta: f32) -> Option<f32> {
        self.frames += 1;
        self.window += delta;

        if self.timer.tick(delta) && self.window > 0.0 {
            self.fps = self.frames as f32 / self.window;
            self.frames = 0;
            self.window = 0.0;
            Some(self.fps)
        } else {
            None
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}
