use crate::shared::frame::Frame;
use crate::shared::region::{Region, Size};

/// Domain interface for a single-class object detector.
///
/// Reported regions are in the coordinate frame of `image`. Implementations
/// may keep internal scratch buffers, hence `&mut self`.
pub trait ObjectClassifier: Send {
    fn detect(
        &mut self,
        image: &Frame,
        min_size: Size,
    ) -> Result<Vec<Region>, Box<dyn std::error::Error>>;
}
