use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Select, Sender};
use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};

use crate::capture::domain::sensor_device::{SensorDevice, SensorError, StreamKind};
use crate::shared::frame::{Frame, PixelFormat};
use crate::shared::mat_convert::mat_to_frame;

/// Frames buffered per stream. A frame that arrives while the previous
/// one is still unread is dropped.
const FRAME_SLOTS: usize = 1;

/// Back-off while no stream is started or the device has nothing new.
const IDLE_POLL: Duration = Duration::from_millis(5);

struct StreamSlot {
    kind: StreamKind,
    format: PixelFormat,
    retrieve_flag: i32,
    present: bool,
    created: bool,
    started: Arc<AtomicBool>,
    frame_tx: Sender<Frame>,
    frame_rx: Receiver<Frame>,
}

impl StreamSlot {
    fn new(kind: StreamKind, present: bool) -> Self {
        let (format, retrieve_flag) = match kind {
            StreamKind::Depth => (PixelFormat::Depth16, videoio::CAP_OPENNI_DEPTH_MAP),
            StreamKind::Color => (PixelFormat::Bgr8, videoio::CAP_OPENNI_BGR_IMAGE),
        };
        let (frame_tx, frame_rx) = crossbeam_channel::bounded(FRAME_SLOTS);
        Self {
            kind,
            format,
            retrieve_flag,
            present,
            created: false,
            started: Arc::new(AtomicBool::new(false)),
            frame_tx,
            frame_rx,
        }
    }

    fn grab_target(&self) -> GrabTarget {
        GrabTarget {
            kind: self.kind,
            format: self.format,
            retrieve_flag: self.retrieve_flag,
            started: self.started.clone(),
            frame_tx: self.frame_tx.clone(),
            sequence: 0,
        }
    }

    fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }
}

/// What the grabber thread needs to feed one stream.
struct GrabTarget {
    kind: StreamKind,
    format: PixelFormat,
    retrieve_flag: i32,
    started: Arc<AtomicBool>,
    frame_tx: Sender<Frame>,
    sequence: usize,
}

impl GrabTarget {
    fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    fn retrieve(&mut self, capture: &mut VideoCapture, mat: &mut Mat) {
        match capture.retrieve(mat, self.retrieve_flag) {
            Ok(true) => {}
            Ok(false) => return,
            Err(e) => {
                log::warn!("Couldn't retrieve {} frame: {e}", self.kind);
                return;
            }
        }
        match mat_to_frame(mat, self.format, self.sequence) {
            Ok(Some(frame)) => {
                self.sequence += 1;
                let _ = self.frame_tx.try_send(frame);
            }
            Ok(None) => {}
            Err(e) => log::warn!("Couldn't convert {} frame: {e}", self.kind),
        }
    }
}

/// Depth camera reached through OpenCV's OpenNI2 capture backend.
///
/// The backend delivers depth and color from a single capture handle, so
/// a grabber thread owns the handle once the first stream starts and
/// hands each started stream's frames to a single-slot channel. Waiting
/// for any stream is a `Select` over those channels.
pub struct OpenNiDevice {
    capture: Option<VideoCapture>,
    depth: StreamSlot,
    color: StreamSlot,
    running: Arc<AtomicBool>,
    grabber: Option<JoinHandle<()>>,
}

impl OpenNiDevice {
    /// Initializes the backend and opens device `index` (0 = first found).
    pub fn open(index: i32) -> Result<Self, SensorError> {
        let capture = VideoCapture::new(index, videoio::CAP_OPENNI2)
            .map_err(|e| SensorError::Initialize(e.to_string()))?;
        let opened = capture
            .is_opened()
            .map_err(|e| SensorError::DeviceOpen(e.to_string()))?;
        if !opened {
            return Err(SensorError::DeviceOpen(format!(
                "no OpenNI2 device at index {index}"
            )));
        }

        let depth_present =
            generator_present(&capture, videoio::CAP_OPENNI_DEPTH_GENERATOR_PRESENT);
        let color_present =
            generator_present(&capture, videoio::CAP_OPENNI_IMAGE_GENERATOR_PRESENT);
        log::info!(
            "Opened OpenNI2 device {index} (depth: {depth_present}, colour: {color_present})"
        );

        Ok(Self {
            capture: Some(capture),
            depth: StreamSlot::new(StreamKind::Depth, depth_present),
            color: StreamSlot::new(StreamKind::Color, color_present),
            running: Arc::new(AtomicBool::new(true)),
            grabber: None,
        })
    }

    fn slot(&self, kind: StreamKind) -> &StreamSlot {
        match kind {
            StreamKind::Depth => &self.depth,
            StreamKind::Color => &self.color,
        }
    }

    fn slot_mut(&mut self, kind: StreamKind) -> &mut StreamSlot {
        match kind {
            StreamKind::Depth => &mut self.depth,
            StreamKind::Color => &mut self.color,
        }
    }

    fn ensure_grabber(&mut self) -> Result<(), String> {
        if self.grabber.is_some() {
            return Ok(());
        }
        let capture = self
            .capture
            .take()
            .ok_or("capture handle already released")?;
        let targets = vec![self.depth.grab_target(), self.color.grab_target()];
        let running = self.running.clone();
        let handle = thread::Builder::new()
            .name("openni-grabber".into())
            .spawn(move || grab_loop(capture, targets, running))
            .map_err(|e| e.to_string())?;
        self.grabber = Some(handle);
        Ok(())
    }
}

fn generator_present(capture: &VideoCapture, prop: i32) -> bool {
    capture.get(prop).map(|v| v != 0.0).unwrap_or(false)
}

fn grab_loop(mut capture: VideoCapture, mut targets: Vec<GrabTarget>, running: Arc<AtomicBool>) {
    let mut mat = Mat::default();
    while running.load(Ordering::Acquire) {
        if !targets.iter().any(GrabTarget::is_started) {
            thread::sleep(IDLE_POLL);
            continue;
        }
        match capture.grab() {
            Ok(true) => {}
            Ok(false) => {
                thread::sleep(IDLE_POLL);
                continue;
            }
            Err(e) => {
                log::warn!("OpenNI2 grab failed: {e}");
                thread::sleep(IDLE_POLL);
                continue;
            }
        }
        for target in targets.iter_mut().filter(|t| t.is_started()) {
            target.retrieve(&mut capture, &mut mat);
        }
    }
    if let Err(e) = capture.release() {
        log::warn!("Couldn't release OpenNI2 capture: {e}");
    }
}

impl SensorDevice for OpenNiDevice {
    fn has_sensor(&self, kind: StreamKind) -> bool {
        self.slot(kind).present
    }

    fn create_stream(&mut self, kind: StreamKind) -> Result<(), SensorError> {
        let slot = self.slot_mut(kind);
        if !slot.present {
            return Err(SensorError::StreamCreate {
                kind,
                detail: "sensor not present".into(),
            });
        }
        slot.created = true;
        Ok(())
    }

    fn start_stream(&mut self, kind: StreamKind) -> Result<(), SensorError> {
        if !self.slot(kind).created {
            return Err(SensorError::StreamStart {
                kind,
                detail: "stream not created".into(),
            });
        }
        self.ensure_grabber()
            .map_err(|detail| SensorError::StreamStart { kind, detail })?;
        self.slot(kind).started.store(true, Ordering::Release);
        Ok(())
    }

    fn stop_stream(&mut self, kind: StreamKind) {
        self.slot(kind).started.store(false, Ordering::Release);
    }

    fn destroy_stream(&mut self, kind: StreamKind) {
        let slot = self.slot_mut(kind);
        slot.created = false;
        while slot.frame_rx.try_recv().is_ok() {}
    }

    fn wait_for_any_stream(
        &mut self,
        streams: &[StreamKind],
        timeout: Duration,
    ) -> Result<usize, SensorError> {
        let mut select = Select::new();
        for &kind in streams {
            select.recv(&self.slot(kind).frame_rx);
        }
        select
            .ready_timeout(timeout)
            .map_err(|e| SensorError::Timeout {
                timeout,
                detail: e.to_string(),
            })
    }

    fn read_frame(&mut self, kind: StreamKind) -> Result<Frame, SensorError> {
        let slot = self.slot(kind);
        if !slot.is_started() {
            return Err(SensorError::NotStarted(kind));
        }
        slot.frame_rx.try_recv().map_err(|e| SensorError::Read {
            kind,
            detail: e.to_string(),
        })
    }

    fn close(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.grabber.take() {
            if handle.join().is_err() {
                log::error!("OpenNI2 grabber thread panicked");
            }
        }
        if let Some(mut capture) = self.capture.take() {
            if let Err(e) = capture.release() {
                log::warn!("Couldn't release OpenNI2 capture: {e}");
            }
        }
    }
}

impl Drop for OpenNiDevice {
    fn drop(&mut self) {
        self.close();
    }
}
