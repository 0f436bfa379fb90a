//! Variable-step frame timing.
//!
//! The galaxy only animates spins and twinkles, so there is no fixed-rate
//! simulation: each redraw advances by the wall-clock time since the last one,
//! clamped so a stalled frame (window drag, breakpoint) cannot jump the scene.

use std::time::Instant;

use orrery_space::MAX_FRAME_DT;
use tracing::warn;

pub struct FrameClock {
    previous: Option<Instant>,
    frame_count: u64,
    clamped_count: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            previous: None,
            frame_count: 0,
            clamped_count: 0,
        }
    }

    /// Seconds since the previous tick, clamped to `[0, MAX_FRAME_DT]`.
    /// The first tick returns 0.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let raw = self
            .previous
            .map_or(0.0, |prev| now.duration_since(prev).as_secs_f32());
        self.previous = Some(now);
        self.advance(raw)
    }

    /// Clamp an externally measured frame time.
    pub fn advance(&mut self, raw_dt: f32) -> f32 {
        self.frame_count += 1;
        if !raw_dt.is_finite() || raw_dt < 0.0 {
            return 0.0;
        }
        if raw_dt > MAX_FRAME_DT {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                raw_dt * 1000.0,
                MAX_FRAME_DT * 1000.0
            );
            self.clamped_count += 1;
            return MAX_FRAME_DT;
        }
        raw_dt
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Frames whose time exceeded the maximum.
    pub fn clamped_count(&self) -> u64 {
        self.clamped_count
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
