use std::path::{Path, PathBuf};

use opencv::core::{Rect, Size as CvSize, Vector};
use opencv::objdetect::{self, CascadeClassifier};
use opencv::prelude::*;
use thiserror::Error;

use crate::detection::domain::object_classifier::ObjectClassifier;
use crate::shared::config::DetectionConfig;
use crate::shared::frame::{Frame, PixelFormat};
use crate::shared::mat_convert::frame_to_mat;
use crate::shared::region::{Region, Size};

#[derive(Error, Debug)]
pub enum ClassifierLoadError {
    #[error("cascade path is not valid UTF-8: {0}")]
    InvalidPath(PathBuf),
    #[error("failed to load cascade {path}: {source}")]
    OpenCv {
        path: PathBuf,
        #[source]
        source: opencv::Error,
    },
    #[error("{0} is not a cascade definition")]
    Empty(PathBuf),
}

/// Viola-Jones detector backed by an OpenCV Haar cascade file.
pub struct HaarCascadeClassifier {
    cascade: CascadeClassifier,
    scale_factor: f64,
    min_neighbors: i32,
}

impl HaarCascadeClassifier {
    pub fn load(path: &Path, config: &DetectionConfig) -> Result<Self, ClassifierLoadError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| ClassifierLoadError::InvalidPath(path.to_path_buf()))?;
        let opencv_err = |source| ClassifierLoadError::OpenCv {
            path: path.to_path_buf(),
            source,
        };
        let cascade = CascadeClassifier::new(path_str).map_err(opencv_err)?;
        if cascade.empty().map_err(opencv_err)? {
            return Err(ClassifierLoadError::Empty(path.to_path_buf()));
        }
        log::debug!("Loaded cascade {}", path.display());
        Ok(Self {
            cascade,
            scale_factor: config.scale_factor,
            min_neighbors: config.min_neighbors,
        })
    }
}

impl ObjectClassifier for HaarCascadeClassifier {
    fn detect(
        &mut self,
        image: &Frame,
        min_size: Size,
    ) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        if image.format() != PixelFormat::Gray8 {
            return Err(format!("expected a grayscale image, got {:?}", image.format()).into());
        }
        let mat = frame_to_mat(image)?;
        let mut objects = Vector::<Rect>::new();
        self.cascade.detect_multi_scale(
            &mat,
            &mut objects,
            self.scale_factor,
            self.min_neighbors,
            objdetect::CASCADE_SCALE_IMAGE,
            CvSize::new(min_size.width, min_size.height),
            CvSize::new(0, 0),
        )?;
        Ok(objects
            .iter()
            .map(|r| Region::new(r.x, r.y, r.width, r.height))
            .collect())
    }
}
