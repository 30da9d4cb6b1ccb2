use crate::shared::config::CaptureConfig;
use crate::shared::frame::Frame;

use super::sensor_device::{SensorDevice, SensorError, StreamKind};

/// Order in which streams are handed to the wait call. The ready index
/// reported by the device is a position in this array.
pub const STREAM_ORDER: [StreamKind; 2] = [StreamKind::Depth, StreamKind::Color];

/// Outcome of one arbitration round.
#[derive(Debug)]
pub enum FrameEvent {
    Depth(Frame),
    Color(Frame),
    /// No stream became ready within the timeout.
    WaitFailed,
    /// The device reported a ready index outside [`STREAM_ORDER`]. Left to
    /// the caller to report.
    UnexpectedStream(usize),
    /// A stream was reported ready but its frame could not be read.
    ReadFailed(StreamKind),
}

/// Scoped ownership of an open device and its streams.
///
/// Opening starts every stream the device supports, degrading when one
/// fails. Dropping stops and destroys whatever was brought up, then
/// closes the device, so release happens on every exit path.
pub struct CaptureSession {
    device: Box<dyn SensorDevice>,
    config: CaptureConfig,
    created: Vec<StreamKind>,
    started: Vec<StreamKind>,
}

impl CaptureSession {
    pub fn open(device: Box<dyn SensorDevice>, config: CaptureConfig) -> Self {
        let mut session = Self {
            device,
            config,
            created: Vec::new(),
            started: Vec::new(),
        };
        for kind in STREAM_ORDER {
            session.bring_up(kind);
        }
        if session.started.is_empty() {
            log::warn!("No streams started; every wait will time out");
        }
        session
    }

    fn bring_up(&mut self, kind: StreamKind) {
        if !self.device.has_sensor(kind) {
            log::info!("Device has no {kind} sensor");
            return;
        }
        if let Err(e) = self.device.create_stream(kind) {
            log::error!("{e}");
            return;
        }
        self.created.push(kind);
        if let Err(e) = self.device.start_stream(kind) {
            log::error!("{e}");
            return;
        }
        self.started.push(kind);
        log::debug!("Started {kind} stream");
    }

    /// Streams that were created and started successfully.
    pub fn active_streams(&self) -> &[StreamKind] {
        &self.started
    }

    /// Waits for whichever stream is ready first and reads one frame from it.
    pub fn next_event(&mut self) -> FrameEvent {
        let ready = match self
            .device
            .wait_for_any_stream(&STREAM_ORDER, self.config.wait_timeout)
        {
            Ok(index) => index,
            Err(e) => {
                log::warn!("{e}");
                return FrameEvent::WaitFailed;
            }
        };

        let Some(&kind) = STREAM_ORDER.get(ready) else {
            return FrameEvent::UnexpectedStream(ready);
        };

        match self.device.read_frame(kind) {
            Ok(frame) => match kind {
                StreamKind::Depth => FrameEvent::Depth(frame),
                StreamKind::Color => FrameEvent::Color(frame),
            },
            Err(e) => {
                log::warn!("{e}");
                FrameEvent::ReadFailed(kind)
            }
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        for &kind in &self.started {
            self.device.stop_stream(kind);
        }
        for &kind in &self.created {
            self.device.destroy_stream(kind);
        }
        self.device.close();
        log::debug!("Capture session closed");
    }
}
