use std::time::Duration;

use super::constants::SAMPLE_READ_WAIT_TIMEOUT_MS;

/// Which iteration of the loop to run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Poll both streams and count frames; quit on a terminal keypress.
    Capture,
    /// Also show the color stream in a window.
    Preview,
    /// Also annotate each color frame with face and eye boxes.
    #[default]
    Detect,
}

impl RunMode {
    pub fn shows_window(self) -> bool {
        matches!(self, RunMode::Preview | RunMode::Detect)
    }

    pub fn detects_faces(self) -> bool {
        matches!(self, RunMode::Detect)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CaptureConfig {
    /// Index of the device to open; 0 is the first one found.
    pub device_index: i32,
    /// Upper bound on a single wait for any stream to become ready.
    pub wait_timeout: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            wait_timeout: Duration::from_millis(SAMPLE_READ_WAIT_TIMEOUT_MS),
        }
    }
}

/// Geometry and classifier tuning for face/eye detection.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionConfig {
    /// Face minimum size as a fraction of frame width and height.
    pub face_min_ratio: f64,
    /// Fraction of the face height searched for eyes, from the top.
    pub eye_band_ratio: f64,
    /// Eye minimum size as a fraction of the eye band width.
    pub eye_min_ratio: f64,
    pub scale_factor: f64,
    pub min_neighbors: i32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            face_min_ratio: 0.25,
            eye_band_ratio: 0.6,
            eye_min_ratio: 0.25,
            scale_factor: 1.1,
            min_neighbors: 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    pub face_color: Rgb,
    pub eye_color: Rgb,
    pub thickness: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            face_color: Rgb::new(0, 0, 255),
            eye_color: Rgb::new(0, 255, 0),
            thickness: 2,
        }
    }
}
