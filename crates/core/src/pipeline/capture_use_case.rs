use std::time::Instant;

use crate::capture::domain::capture_session::{CaptureSession, FrameEvent};
use crate::detection::domain::face_eye_detector::FaceEyeDetector;
use crate::display::domain::frame_sink::FrameSink;
use crate::display::domain::quit_signal::QuitSignal;
use crate::rendering::domain::annotation::Annotation;
use crate::rendering::domain::frame_annotator::FrameAnnotator;
use crate::shared::frame::Frame;

use super::capture_logger::CaptureLogger;
use super::frame_counts::FrameCounts;

/// Runs the capture-and-annotate loop over an open session.
///
/// Every iteration arbitrates one frame, updates the counters and, for
/// colour frames, optionally detects a face with its eyes, draws the boxes
/// and hands the frame to the sink. Without a detector colour frames are
/// shown as delivered; without a sink nothing is displayed.
pub struct CaptureUseCase {
    session: CaptureSession,
    detector: Option<FaceEyeDetector>,
    annotator: Box<dyn FrameAnnotator>,
    sink: Option<Box<dyn FrameSink>>,
    quit: Box<dyn QuitSignal>,
    logger: Box<dyn CaptureLogger>,
    counts: FrameCounts,
}

impl CaptureUseCase {
    pub fn new(
        session: CaptureSession,
        detector: Option<FaceEyeDetector>,
        annotator: Box<dyn FrameAnnotator>,
        sink: Option<Box<dyn FrameSink>>,
        quit: Box<dyn QuitSignal>,
        logger: Box<dyn CaptureLogger>,
    ) -> Self {
        Self {
            session,
            detector,
            annotator,
            sink,
            quit,
            logger,
            counts: FrameCounts::default(),
        }
    }

    pub fn counts(&self) -> FrameCounts {
        self.counts
    }

    /// Loops until the quit signal fires, then reports the totals.
    ///
    /// Consumes the use case so the session, and with it the device, is
    /// released before this returns.
    pub fn run(mut self) -> Result<FrameCounts, Box<dyn std::error::Error>> {
        self.logger.info(&format!(
            "Capturing from {} stream(s)",
            self.session.active_streams().len()
        ));
        while !self.quit.requested()? {
            self.step()?;
        }
        self.logger.summary();
        Ok(self.counts)
    }

    /// One loop iteration. Returns the boxes drawn on the colour frame, if
    /// any.
    pub fn step(&mut self) -> Result<Vec<Annotation>, Box<dyn std::error::Error>> {
        let event = self.session.next_event();
        self.counts.record(&event);

        let annotations = match event {
            FrameEvent::Color(frame) => self.process_color(frame)?,
            FrameEvent::UnexpectedStream(index) => {
                self.logger.error(&format!("Unexpected stream: {index}"));
                Vec::new()
            }
            _ => Vec::new(),
        };

        self.logger.progress(&self.counts);
        Ok(annotations)
    }

    fn process_color(
        &mut self,
        frame: Frame,
    ) -> Result<Vec<Annotation>, Box<dyn std::error::Error>> {
        let Some(mut rgb) = frame.to_rgb() else {
            return Ok(Vec::new());
        };

        let annotations = self.detect(&rgb);
        if !annotations.is_empty() {
            self.annotator.annotate(&mut rgb, &annotations)?;
        }

        if let Some(sink) = self.sink.as_mut() {
            let t0 = Instant::now();
            sink.show(&rgb)?;
            self.logger
                .timing("display", t0.elapsed().as_secs_f64() * 1000.0);
        }
        Ok(annotations)
    }

    /// A failing classifier costs one frame's annotations, not the loop.
    fn detect(&mut self, rgb: &Frame) -> Vec<Annotation> {
        let Some(detector) = self.detector.as_mut() else {
            return Vec::new();
        };
        let Some(gray) = rgb.to_grayscale() else {
            return Vec::new();
        };

        let t0 = Instant::now();
        let result = detector.detect(&gray);
        self.logger
            .timing("detect", t0.elapsed().as_secs_f64() * 1000.0);

        match result {
            Ok(Some(found)) => found.annotations(),
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Detection failed on frame {}: {e}", rgb.index());
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::domain::sensor_device::{SensorDevice, SensorError, StreamKind};
    use crate::detection::domain::object_classifier::ObjectClassifier;
    use crate::pipeline::capture_logger::NullCaptureLogger;
    use crate::rendering::domain::annotation::Feature;
    use crate::rendering::infrastructure::box_annotator::BoxAnnotator;
    use crate::shared::config::{CaptureConfig, DetectionConfig};
    use crate::shared::frame::PixelFormat;
    use crate::shared::region::{Region, Size};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    // --- Stubs ---

    struct StubDevice {
        ready: VecDeque<usize>,
        color: Frame,
        closed: Arc<Mutex<bool>>,
    }

    impl StubDevice {
        fn new(ready: Vec<usize>, color: Frame) -> (Self, Arc<Mutex<bool>>) {
            let closed = Arc::new(Mutex::new(false));
            (
                Self {
                    ready: ready.into(),
                    color,
                    closed: closed.clone(),
                },
                closed,
            )
        }
    }

    impl SensorDevice for StubDevice {
        fn has_sensor(&self, _kind: StreamKind) -> bool {
            true
        }

        fn create_stream(&mut self, _kind: StreamKind) -> Result<(), SensorError> {
            Ok(())
        }

        fn start_stream(&mut self, _kind: StreamKind) -> Result<(), SensorError> {
            Ok(())
        }

        fn stop_stream(&mut self, _kind: StreamKind) {}

        fn destroy_stream(&mut self, _kind: StreamKind) {}

        fn wait_for_any_stream(
            &mut self,
            _streams: &[StreamKind],
            timeout: Duration,
        ) -> Result<usize, SensorError> {
            self.ready.pop_front().ok_or(SensorError::Timeout {
                timeout,
                detail: "stub".into(),
            })
        }

        fn read_frame(&mut self, kind: StreamKind) -> Result<Frame, SensorError> {
            Ok(match kind {
                StreamKind::Depth => Frame::new(vec![0; 8], 2, 2, PixelFormat::Depth16, 0),
                StreamKind::Color => self.color.clone(),
            })
        }

        fn close(&mut self) {
            *self.closed.lock().unwrap() = true;
        }
    }

    type Calls = Arc<Mutex<usize>>;

    struct StubClassifier {
        results: Vec<Region>,
        calls: Calls,
    }

    impl StubClassifier {
        fn new(results: Vec<Region>) -> (Self, Calls) {
            let calls: Calls = Arc::new(Mutex::new(0));
            (
                Self {
                    results,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    impl ObjectClassifier for StubClassifier {
        fn detect(
            &mut self,
            _image: &Frame,
            _min_size: Size,
        ) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
            *self.calls.lock().unwrap() += 1;
            Ok(self.results.clone())
        }
    }

    struct FailingClassifier;

    impl ObjectClassifier for FailingClassifier {
        fn detect(
            &mut self,
            _image: &Frame,
            _min_size: Size,
        ) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
            Err("classifier error".into())
        }
    }

    struct StubSink {
        shown: Arc<Mutex<Vec<Frame>>>,
    }

    impl FrameSink for StubSink {
        fn show(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            self.shown.lock().unwrap().push(frame.clone());
            Ok(())
        }
    }

    /// Quits after a fixed number of polls.
    struct QuitAfter(usize);

    impl QuitSignal for QuitAfter {
        fn requested(&mut self) -> Result<bool, Box<dyn std::error::Error>> {
            if self.0 == 0 {
                return Ok(true);
            }
            self.0 -= 1;
            Ok(false)
        }
    }

    /// Keeps reported errors for inspection.
    struct RecordingLogger {
        errors: Arc<Mutex<Vec<String>>>,
    }

    impl CaptureLogger for RecordingLogger {
        fn progress(&mut self, _counts: &FrameCounts) {}
        fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
        fn info(&mut self, _message: &str) {}
        fn error(&mut self, message: &str) {
            self.errors.lock().unwrap().push(message.to_string());
        }
    }

    // --- Helpers ---

    fn gray_frame(width: u32, height: u32) -> Frame {
        Frame::new(
            vec![0; (width * height) as usize],
            width,
            height,
            PixelFormat::Gray8,
            0,
        )
    }

    fn session(ready: Vec<usize>, color: Frame) -> (CaptureSession, Arc<Mutex<bool>>) {
        let (device, closed) = StubDevice::new(ready, color);
        let config = CaptureConfig {
            wait_timeout: Duration::from_millis(1),
            ..CaptureConfig::default()
        };
        (CaptureSession::open(Box::new(device), config), closed)
    }

    struct Built {
        use_case: CaptureUseCase,
        shown: Arc<Mutex<Vec<Frame>>>,
        closed: Arc<Mutex<bool>>,
        errors: Arc<Mutex<Vec<String>>>,
    }

    fn build(
        ready: Vec<usize>,
        color: Frame,
        detector: Option<FaceEyeDetector>,
        polls: usize,
    ) -> Built {
        let (session, closed) = session(ready, color);
        let shown = Arc::new(Mutex::new(Vec::new()));
        let errors = Arc::new(Mutex::new(Vec::new()));
        let use_case = CaptureUseCase::new(
            session,
            detector,
            Box::new(BoxAnnotator::default()),
            Some(Box::new(StubSink {
                shown: shown.clone(),
            })),
            Box::new(QuitAfter(polls)),
            Box::new(RecordingLogger {
                errors: errors.clone(),
            }),
        );
        Built {
            use_case,
            shown,
            closed,
            errors,
        }
    }

    fn detector(
        faces: Vec<Region>,
        left: Vec<Region>,
        right: Vec<Region>,
    ) -> (FaceEyeDetector, Calls, Calls) {
        let (face, _) = StubClassifier::new(faces);
        let (left, left_calls) = StubClassifier::new(left);
        let (right, right_calls) = StubClassifier::new(right);
        (
            FaceEyeDetector::new(
                Box::new(face),
                Box::new(left),
                Box::new(right),
                DetectionConfig::default(),
            ),
            left_calls,
            right_calls,
        )
    }

    fn pixel(frame: &Frame, x: usize, y: usize) -> Vec<u8> {
        frame.as_ndarray().slice(ndarray::s![y, x, ..]).to_vec()
    }

    // --- Counters ---

    #[test]
    fn test_depth_ready_counts_depth() {
        let mut b = build(vec![0], gray_frame(4, 4), None, 0);
        b.use_case.step().unwrap();
        assert_eq!(b.use_case.counts(), FrameCounts { depth: 1, color: 0 });
        assert!(b.shown.lock().unwrap().is_empty());
    }

    #[test]
    fn test_color_ready_counts_color_and_shows() {
        let mut b = build(vec![1], gray_frame(4, 4), None, 0);
        b.use_case.step().unwrap();
        assert_eq!(b.use_case.counts(), FrameCounts { depth: 0, color: 1 });
        assert_eq!(b.shown.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_unexpected_index_changes_nothing_and_reports_error() {
        let mut b = build(vec![7], gray_frame(4, 4), None, 0);
        b.use_case.step().unwrap();
        assert_eq!(b.use_case.counts(), FrameCounts::default());
        assert!(b.shown.lock().unwrap().is_empty());
        assert_eq!(*b.errors.lock().unwrap(), vec!["Unexpected stream: 7"]);
    }

    #[test]
    fn test_known_streams_report_no_error() {
        let mut b = build(vec![0, 1], gray_frame(4, 4), None, 0);
        b.use_case.step().unwrap();
        b.use_case.step().unwrap();
        assert!(b.errors.lock().unwrap().is_empty());
    }

    #[test]
    fn test_timeout_changes_nothing_and_loop_continues() {
        let mut b = build(vec![], gray_frame(4, 4), None, 0);
        b.use_case.step().unwrap();
        b.use_case.step().unwrap();
        assert_eq!(b.use_case.counts(), FrameCounts::default());
    }

    #[test]
    fn test_run_counts_mixed_sequence() {
        let b = build(vec![0, 1, 0, 5, 1], gray_frame(4, 4), None, 6);
        let counts = b.use_case.run().unwrap();
        assert_eq!(counts, FrameCounts { depth: 2, color: 2 });
        assert_eq!(b.shown.lock().unwrap().len(), 2);
    }

    // --- Release ---

    #[test]
    fn test_quit_before_first_frame_still_releases_device() {
        let b = build(vec![1], gray_frame(4, 4), None, 0);
        let counts = b.use_case.run().unwrap();
        assert_eq!(counts, FrameCounts::default());
        assert!(*b.closed.lock().unwrap());
    }

    #[test]
    fn test_run_releases_device_on_return() {
        let b = build(vec![0, 1], gray_frame(4, 4), None, 2);
        b.use_case.run().unwrap();
        assert!(*b.closed.lock().unwrap());
    }

    // --- Detection ---

    #[test]
    fn test_reference_scene_draws_face_and_both_eyes() {
        let (det, _, _) = detector(
            vec![Region::new(100, 50, 200, 200)],
            vec![Region::new(10, 10, 30, 30)],
            vec![Region::new(150, 10, 30, 30)],
        );
        let mut b = build(vec![1], gray_frame(640, 480), Some(det), 0);

        let drawn = b.use_case.step().unwrap();
        assert_eq!(
            drawn,
            vec![
                Annotation::new(Feature::Face, Region::new(100, 50, 200, 200)),
                Annotation::new(Feature::LeftEye, Region::new(110, 60, 30, 30)),
                Annotation::new(Feature::RightEye, Region::new(250, 60, 30, 30)),
            ]
        );

        let shown = b.shown.lock().unwrap();
        assert_eq!(shown.len(), 1);
        let frame = &shown[0];
        assert_eq!(frame.format(), PixelFormat::Rgb8);
        assert_eq!(pixel(frame, 100, 50), vec![0, 0, 255]);
        assert_eq!(pixel(frame, 110, 60), vec![0, 255, 0]);
        assert_eq!(pixel(frame, 250, 60), vec![0, 255, 0]);
        assert_eq!(pixel(frame, 5, 5), vec![0, 0, 0]);
    }

    #[test]
    fn test_no_face_skips_eyes_and_shows_plain_frame() {
        let (det, left_calls, right_calls) = detector(
            vec![],
            vec![Region::new(1, 1, 5, 5)],
            vec![Region::new(1, 1, 5, 5)],
        );
        let mut b = build(vec![1], gray_frame(64, 48), Some(det), 0);

        assert!(b.use_case.step().unwrap().is_empty());
        assert_eq!(*left_calls.lock().unwrap(), 0);
        assert_eq!(*right_calls.lock().unwrap(), 0);
        let shown = b.shown.lock().unwrap();
        assert!(shown[0].data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_depth_frame_never_runs_detection() {
        let (det, left_calls, _) = detector(
            vec![Region::new(0, 0, 10, 10)],
            vec![Region::new(1, 1, 2, 2)],
            vec![],
        );
        let mut b = build(vec![0], gray_frame(64, 48), Some(det), 0);
        assert!(b.use_case.step().unwrap().is_empty());
        assert_eq!(*left_calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_classifier_failure_shows_frame_unannotated() {
        let det = FaceEyeDetector::new(
            Box::new(FailingClassifier),
            Box::new(FailingClassifier),
            Box::new(FailingClassifier),
            DetectionConfig::default(),
        );
        let mut b = build(vec![1, 1], gray_frame(64, 48), Some(det), 0);

        assert!(b.use_case.step().unwrap().is_empty());
        assert!(b.use_case.step().unwrap().is_empty());
        assert_eq!(b.use_case.counts().color, 2);
        assert_eq!(b.shown.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_without_sink_nothing_is_shown() {
        let (session, _closed) = session(vec![1], gray_frame(4, 4));
        let mut use_case = CaptureUseCase::new(
            session,
            None,
            Box::new(BoxAnnotator::default()),
            None,
            Box::new(QuitAfter(0)),
            Box::new(NullCaptureLogger),
        );
        use_case.step().unwrap();
        assert_eq!(use_case.counts().color, 1);
    }
}
