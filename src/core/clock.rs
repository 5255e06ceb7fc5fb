use std::time::Instant;

use crate::frame::FrameInfo;

/// Longest delta handed to per-frame systems, in seconds.
/// A window that was minimised or dragged resumes smoothly instead of jumping.
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Render-loop clock - tracks delta and elapsed time
/// Systems manage their own internal state
#[derive(Debug)]
pub struct Clock {
    start: Instant,
    last_tick: Instant,
    frame_number: u64,
}

impl Clock {
    /// Create new clock starting now
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
            frame_number: 0,
        }
    }

    /// Advance the clock and describe the frame about to be rendered
    pub fn tick(&mut self) -> FrameInfo {
        let now = Instant::now();
        let delta = now
            .duration_since(self.last_tick)
            .as_secs_f32()
            .min(MAX_FRAME_DELTA);
        let time = now.duration_since(self.start).as_secs_f32();
        self.last_tick = now;

        let info = FrameInfo::new(self.frame_number, time, delta);
        self.frame_number += 1;
        info
    }

    /// Seconds since the clock was created
    pub fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    /// Reset the delta baseline, keeping elapsed time
    pub fn reset(&mut self) {
        self.last_tick = Instant::now();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
