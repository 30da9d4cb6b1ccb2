use opencv::core::Mat;
use opencv::{highgui, imgproc};

use crate::display::domain::frame_sink::FrameSink;
use crate::shared::frame::{Frame, PixelFormat};
use crate::shared::mat_convert::frame_to_mat;

/// Auto-sized OpenCV window. Destroyed on drop.
pub struct HighguiWindow {
    title: String,
}

impl HighguiWindow {
    pub fn open(title: &str) -> opencv::Result<Self> {
        highgui::named_window(title, highgui::WINDOW_AUTOSIZE)?;
        Ok(Self {
            title: title.to_string(),
        })
    }
}

impl FrameSink for HighguiWindow {
    fn show(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let mat = frame_to_mat(frame)?;
        // highgui expects BGR channel order.
        let shown = if frame.format() == PixelFormat::Rgb8 {
            let mut bgr = Mat::default();
            imgproc::cvt_color_def(&mat, &mut bgr, imgproc::COLOR_RGB2BGR)?;
            bgr
        } else {
            mat
        };
        highgui::imshow(&self.title, &shown)?;
        Ok(())
    }
}

impl Drop for HighguiWindow {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_window(&self.title) {
            log::warn!("Couldn't close window {}: {e}", self.title);
        }
    }
}
