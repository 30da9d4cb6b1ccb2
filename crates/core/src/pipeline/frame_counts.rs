use std::fmt;

use crate::capture::domain::capture_session::FrameEvent;

/// Running totals of frames delivered per stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameCounts {
    pub depth: u64,
    pub color: u64,
}

impl FrameCounts {
    /// Counts a delivered frame. Waits that produced no frame change nothing.
    pub fn record(&mut self, event: &FrameEvent) {
        match event {
            FrameEvent::Depth(_) => self.depth += 1,
            FrameEvent::Color(_) => self.color += 1,
            FrameEvent::WaitFailed
            | FrameEvent::UnexpectedStream(_)
            | FrameEvent::ReadFailed(_) => {}
        }
    }
}

impl fmt::Display for FrameCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Depth frames : {}  Colour frames : {}",
            self.depth, self.color
        )
    }
}
