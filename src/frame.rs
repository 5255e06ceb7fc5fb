/// Frame metadata - carries frame number and timing info
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub number: u64,
    /// Seconds since the clock started
    pub time: f32,
    /// Seconds since the previous frame
    pub delta: f32,
}

impl FrameInfo {
    pub fn new(number: u64, time: f32, delta: f32) -> Self {
        Self { number, time, delta }
    }
}

/// Deterministic frame source for simulations and tests.
/// Yields `FrameInfo` values spaced by a fixed delta.
pub struct FixedStepFrames {
    frame_number: u64,
    time: f32,
    delta: f32,
}

impl FixedStepFrames {
    pub fn new(delta: f32) -> Self {
        Self {
            frame_number: 0,
            time: 0.0,
            delta: delta.max(0.0),
        }
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }
}

impl Iterator for FixedStepFrames {
    type Item = FrameInfo;

    fn next(&mut self) -> Option<FrameInfo> {
        self.time += self.delta;
        let info = FrameInfo::new(self.frame_number, self.time, self.delta);
        self.frame_number += 1;
        Some(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_step_frames_advance_time() {
        let frames: Vec<_> = FixedStepFrames::new(0.5).take(4).collect();

        assert_eq!(frames[0].number, 0);
        assert_eq!(frames[3].number, 3);
        assert!((frames[3].time - 2.0).abs() < 1e-6);
        assert!(frames.iter().all(|f| f.delta == 0.5));
    }

    #[test]
    fn negative_delta_is_clamped() {
        let frame = FixedStepFrames::new(-1.0).next().unwrap();
        assert_eq!(frame.delta, 0.0);
        assert_eq!(frame.time, 0.0);
    }
}
