use crate::shared::frame::Frame;

use super::annotation::Annotation;

/// Domain interface for drawing detection boxes onto a frame.
///
/// Implementations modify the frame in-place.
pub trait FrameAnnotator: Send {
    fn annotate(
        &self,
        frame: &mut Frame,
        annotations: &[Annotation],
    ) -> Result<(), Box<dyn std::error::Error>>;
}
