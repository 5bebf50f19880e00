use std::fmt;
use std::time::Instant;

use crate::generator::Generator;
use crate::state::ViewerState;
use crate::timing::elapsed_seconds;

/// Throughput measured over one instrumentation interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FpsReport {
    pub frames: u64,
    pub elapsed_seconds: f64,
}

impl FpsReport {
    /// Frames per second, or `None` when no time has elapsed.
    pub fn fps(&self) -> Option<f64> {
        if self.elapsed_seconds > 0.0 {
            Some(self.frames as f64 / self.elapsed_seconds)
        } else {
            None
        }
    }
}

impl fmt::Display for FpsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fps() {
            Some(fps) => write!(f, "FPS: {fps:.2}"),
            None => f.write_str("FPS: n/a"),
        }
    }
}

/// Closes the current interval at `now`: measures it, then zeroes the frame
/// counter and moves the anchor.
pub(crate) fn close_interval<G: Generator>(
    state: &mut ViewerState<'_, G>,
    now: Instant,
) -> FpsReport {
    let report = FpsReport {
        frames: state.frame_count,
        elapsed_seconds: elapsed_seconds(state.timing_anchor, now),
    };
    state.frame_count = 0;
    state.timing_anchor = now;
    report
}
