use crate::rendering::domain::annotation::{Annotation, Feature};
use crate::shared::config::DetectionConfig;
use crate::shared::frame::Frame;
use crate::shared::region::{Region, Size};

use super::object_classifier::ObjectClassifier;

/// One detected face and the eyes found inside it, all in full-frame
/// coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceEyes {
    pub face: Region,
    pub left_eye: Option<Region>,
    pub right_eye: Option<Region>,
}

impl FaceEyes {
    /// Face first, then whichever eyes were found.
    pub fn annotations(&self) -> Vec<Annotation> {
        let mut out = vec![Annotation::new(Feature::Face, self.face)];
        if let Some(eye) = self.left_eye {
            out.push(Annotation::new(Feature::LeftEye, eye));
        }
        if let Some(eye) = self.right_eye {
            out.push(Annotation::new(Feature::RightEye, eye));
        }
        out
    }
}

/// Finds a face, then searches the upper part of it for each eye.
///
/// Only the first face and the first hit of each eye classifier are used;
/// further candidates are ignored, with no ranking by size or confidence.
pub struct FaceEyeDetector {
    face: Box<dyn ObjectClassifier>,
    left_eye: Box<dyn ObjectClassifier>,
    right_eye: Box<dyn ObjectClassifier>,
    config: DetectionConfig,
}

impl FaceEyeDetector {
    pub fn new(
        face: Box<dyn ObjectClassifier>,
        left_eye: Box<dyn ObjectClassifier>,
        right_eye: Box<dyn ObjectClassifier>,
        config: DetectionConfig,
    ) -> Self {
        Self {
            face,
            left_eye,
            right_eye,
            config,
        }
    }

    pub fn face_min_size(&self, width: u32, height: u32) -> Size {
        Size::scaled(width, height, self.config.face_min_ratio)
    }

    /// Upper part of the face box where the eyes are searched.
    pub fn eye_band(&self, face: &Region) -> Region {
        face.top_band(self.config.eye_band_ratio)
    }

    /// Square minimum size derived from the band width.
    pub fn eye_min_size(&self, band: &Region) -> Size {
        let side = (band.width as f64 * self.config.eye_min_ratio) as i32;
        Size::new(side, side)
    }

    /// Runs face then eye detection on a grayscale image.
    ///
    /// Returns `None` when no face is found; the eye classifiers are not
    /// run in that case.
    pub fn detect(
        &mut self,
        gray: &Frame,
    ) -> Result<Option<FaceEyes>, Box<dyn std::error::Error>> {
        let min_face = self.face_min_size(gray.width(), gray.height());
        let Some(face) = first(&mut *self.face, gray, min_face)? else {
            return Ok(None);
        };

        let mut found = FaceEyes {
            face,
            left_eye: None,
            right_eye: None,
        };

        // Eye hits are local to the crop and are shifted back by its origin.
        let Some(band) = self
            .eye_band(&face)
            .clamp_to(gray.width(), gray.height())
        else {
            return Ok(Some(found));
        };
        let Some(band_image) = gray.crop(&band) else {
            return Ok(Some(found));
        };
        let min_eye = self.eye_min_size(&band);

        found.left_eye =
            first(&mut *self.left_eye, &band_image, min_eye)?.map(|eye| eye.offset_by(&band));
        found.right_eye =
            first(&mut *self.right_eye, &band_image, min_eye)?.map(|eye| eye.offset_by(&band));

        Ok(Some(found))
    }
}

fn first(
    classifier: &mut dyn ObjectClassifier,
    image: &Frame,
    min_size: Size,
) -> Result<Option<Region>, Box<dyn std::error::Error>> {
    Ok(classifier.detect(image, min_size)?.into_iter().next())
}
