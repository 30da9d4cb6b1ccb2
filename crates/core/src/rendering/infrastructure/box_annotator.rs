use ndarray::{s, Axis};

use crate::rendering::domain::annotation::Annotation;
use crate::rendering::domain::frame_annotator::FrameAnnotator;
use crate::shared::config::{RenderConfig, Rgb};
use crate::shared::frame::{luma, Frame, PixelFormat};
use crate::shared::region::Region;

/// CPU annotator drawing rectangle outlines straight into the frame buffer.
///
/// Faces use `face_color`, both eyes `eye_color`. Outlines are drawn
/// inside the box and clipped at the frame edges.
pub struct BoxAnnotator {
    config: RenderConfig,
}

impl BoxAnnotator {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    fn color_for(&self, annotation: &Annotation) -> Rgb {
        if annotation.feature.is_eye() {
            self.config.eye_color
        } else {
            self.config.face_color
        }
    }
}

impl Default for BoxAnnotator {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl FrameAnnotator for BoxAnnotator {
    fn annotate(
        &self,
        frame: &mut Frame,
        annotations: &[Annotation],
    ) -> Result<(), Box<dyn std::error::Error>> {
        for annotation in annotations {
            let pixel = pixel_bytes(self.color_for(annotation), frame.format())?;
            draw_outline(frame, &annotation.region, &pixel, self.config.thickness);
        }
        Ok(())
    }
}

fn pixel_bytes(color: Rgb, format: PixelFormat) -> Result<Vec<u8>, String> {
    match format {
        PixelFormat::Rgb8 => Ok(vec![color.r, color.g, color.b]),
        PixelFormat::Bgr8 => Ok(vec![color.b, color.g, color.r]),
        PixelFormat::Gray8 => Ok(vec![luma(color.r, color.g, color.b)]),
        PixelFormat::Depth16 => Err("cannot annotate a depth frame".into()),
    }
}

fn draw_outline(frame: &mut Frame, region: &Region, pixel: &[u8], thickness: u32) {
    let Some(r) = region.clamp_to(frame.width(), frame.height()) else {
        return;
    };
    let t = (thickness.max(1) as i32).min(r.width).min(r.height);
    let bands = [
        Region::new(r.x, r.y, r.width, t),
        Region::new(r.x, r.bottom() - t, r.width, t),
        Region::new(r.x, r.y, t, r.height),
        Region::new(r.right() - t, r.y, t, r.height),
    ];
    for band in &bands {
        fill(frame, band, pixel);
    }
}

fn fill(frame: &mut Frame, band: &Region, pixel: &[u8]) {
    let (y0, y1) = (band.y as usize, band.bottom() as usize);
    let (x0, x1) = (band.x as usize, band.right() as usize);
    let mut view = frame.as_ndarray_mut();
    let mut roi = view.slice_mut(s![y0..y1, x0..x1, ..]);
    for mut px in roi.lanes_mut(Axis(2)) {
        for (dst, &src) in px.iter_mut().zip(pixel) {
            *dst = src;
        }
    }
}
