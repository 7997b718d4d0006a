use std::time::Duration;

/// one 60Hz frame
pub const TIMER_INTERVAL: Duration = Duration::from_micros(16_667);

/// Accumulates wall-clock time and hands it back as whole 60Hz frames,
/// carrying the remainder into the next call.
#[derive(Debug, Clone, Default)]
pub struct FrameTimer {
    accumulated: Duration,
}

impl FrameTimer {
    pub fn new() -> Self {
        FrameTimer::default()
    }

    /// add `elapsed` and return how many whole frames have now passed
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulated = self.accumulated.saturating_add(elapsed);
        let frames = self.accumulated.as_nanos() / TIMER_INTERVAL.as_nanos();
        if frames > u32::MAX as u128 {
            // more frames than any timer can count down, drop the remainder
            self.accumulated = Duration::ZERO;
            return u32::MAX;
        }
        let frames = frames as u32;
        self.accumulated -= TIMER_INTERVAL * frames;
        frames
    }

    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
    }
}

/// count a timer down by `frames`, stopping at zero
pub fn decay(timer: u8, frames: u32) -> u8 {
    timer.saturating_sub(frames.min(u8::MAX as u32) as u8)
}
