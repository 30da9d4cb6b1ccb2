use crate::shared::frame::Frame;

/// Domain interface for presenting frames to the user.
pub trait FrameSink {
    fn show(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;
}
