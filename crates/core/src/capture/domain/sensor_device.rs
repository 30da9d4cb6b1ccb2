use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::shared::frame::Frame;

/// The two data streams a depth camera exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Depth,
    Color,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Depth => write!(f, "depth"),
            StreamKind::Color => write!(f, "colour"),
        }
    }
}

#[derive(Error, Debug)]
pub enum SensorError {
    #[error("Initialize failed: {0}")]
    Initialize(String),
    #[error("Couldn't open device: {0}")]
    DeviceOpen(String),
    #[error("Couldn't create the {kind} stream: {detail}")]
    StreamCreate { kind: StreamKind, detail: String },
    #[error("Couldn't start the {kind} stream: {detail}")]
    StreamStart { kind: StreamKind, detail: String },
    #[error("The {0} stream is not started")]
    NotStarted(StreamKind),
    #[error("Wait failed! (timeout is {} ms): {detail}", .timeout.as_millis())]
    Timeout { timeout: Duration, detail: String },
    #[error("Couldn't read a {kind} frame: {detail}")]
    Read { kind: StreamKind, detail: String },
}

/// Domain interface for a depth camera and its streams.
///
/// Mirrors the sensor SDK lifecycle: a stream is created, then started,
/// before frames can be read; it is stopped and destroyed before the
/// device is closed. [`CaptureSession`](super::capture_session::CaptureSession)
/// enforces that order.
pub trait SensorDevice: Send {
    fn has_sensor(&self, kind: StreamKind) -> bool;

    fn create_stream(&mut self, kind: StreamKind) -> Result<(), SensorError>;

    fn start_stream(&mut self, kind: StreamKind) -> Result<(), SensorError>;

    fn stop_stream(&mut self, kind: StreamKind);

    fn destroy_stream(&mut self, kind: StreamKind);

    /// Blocks until one of `streams` has a frame ready and returns its
    /// position in `streams`, or fails with [`SensorError::Timeout`].
    fn wait_for_any_stream(
        &mut self,
        streams: &[StreamKind],
        timeout: Duration,
    ) -> Result<usize, SensorError>;

    /// Reads the pending frame of a started stream.
    fn read_frame(&mut self, kind: StreamKind) -> Result<Frame, SensorError>;

    /// Closes the device and shuts down the sensor subsystem.
    fn close(&mut self);
}
