use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use faceoff_core::capture::domain::capture_session::CaptureSession;
use faceoff_core::capture::infrastructure::openni_device::OpenNiDevice;
use faceoff_core::detection::domain::face_eye_detector::FaceEyeDetector;
use faceoff_core::detection::infrastructure::haar_cascade_classifier::HaarCascadeClassifier;
use faceoff_core::display::domain::frame_sink::FrameSink;
use faceoff_core::display::domain::quit_signal::QuitSignal;
use faceoff_core::display::infrastructure::highgui_key_wait::HighguiKeyWait;
use faceoff_core::display::infrastructure::highgui_window::HighguiWindow;
use faceoff_core::display::infrastructure::terminal_key_poll::TerminalKeyPoll;
use faceoff_core::pipeline::capture_logger::StatusLineLogger;
use faceoff_core::pipeline::capture_use_case::CaptureUseCase;
use faceoff_core::pipeline::frame_counts::FrameCounts;
use faceoff_core::rendering::infrastructure::box_annotator::BoxAnnotator;
use faceoff_core::shared::config::{CaptureConfig, DetectionConfig, RunMode};
use faceoff_core::shared::constants::{APP_NAME, SAMPLE_READ_WAIT_TIMEOUT_MS, WINDOW_TITLE};
use faceoff_core::shared::data_resolver;

/// Depth camera capture with live face and eye detection.
#[derive(Parser)]
#[command(name = "faceoff", version)]
struct Cli {
    /// What to do with the streams.
    #[arg(long, value_enum, default_value_t = Mode::Detect)]
    mode: Mode,

    /// Index of the OpenNI device to open (0 = first found).
    #[arg(long, default_value_t = 0)]
    device: i32,

    /// How long to wait for any stream before reporting a timeout.
    #[arg(long, default_value_t = SAMPLE_READ_WAIT_TIMEOUT_MS)]
    timeout_ms: u64,

    /// Directory holding the Haar cascade files (skips the default lookup).
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Count depth and colour frames only.
    Capture,
    /// Count frames and show the colour stream.
    Preview,
    /// Show the colour stream with face and eye boxes.
    Detect,
}

impl From<Mode> for RunMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Capture => RunMode::Capture,
            Mode::Preview => RunMode::Preview,
            Mode::Detect => RunMode::Detect,
        }
    }
}

/// An error together with the process exit code it maps to.
struct Failure {
    code: i32,
    error: Box<dyn std::error::Error>,
}

impl Failure {
    /// Device, stream subsystem, window or argument problems.
    fn setup(error: impl Into<Box<dyn std::error::Error>>) -> Self {
        Self {
            code: 1,
            error: error.into(),
        }
    }

    /// Missing or unreadable cascade definitions.
    fn classifiers(error: impl Into<Box<dyn std::error::Error>>) -> Self {
        Self {
            code: -1,
            error: error.into(),
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            process::exit(1);
        }
        Err(e) => e.exit(),
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();

    println!(
        "{APP_NAME} v{}.{}",
        env!("CARGO_PKG_VERSION_MAJOR"),
        env!("CARGO_PKG_VERSION_MINOR")
    );
    println!("hit a key to quit");

    match run(&cli) {
        Ok(counts) => log::info!("Done: {counts}"),
        Err(failure) => {
            log::error!("{}", failure.error);
            process::exit(failure.code);
        }
    }
}

fn run(cli: &Cli) -> Result<FrameCounts, Failure> {
    validate(cli).map_err(Failure::setup)?;
    let mode = RunMode::from(cli.mode);

    // Cascades load before the device opens so a bad install fails fast.
    let detector = if mode.detects_faces() {
        Some(build_detector(cli.data_dir.as_deref()).map_err(Failure::classifiers)?)
    } else {
        None
    };

    let config = CaptureConfig {
        device_index: cli.device,
        wait_timeout: Duration::from_millis(cli.timeout_ms),
    };
    let device = OpenNiDevice::open(config.device_index).map_err(Failure::setup)?;
    let session = CaptureSession::open(Box::new(device), config);

    let (sink, quit): (Option<Box<dyn FrameSink>>, Box<dyn QuitSignal>) = if mode.shows_window() {
        let window: Box<dyn FrameSink> =
            Box::new(HighguiWindow::open(WINDOW_TITLE).map_err(Failure::setup)?);
        (Some(window), Box::new(HighguiKeyWait::default()))
    } else {
        (None, Box::new(TerminalKeyPoll::new()))
    };

    let use_case = CaptureUseCase::new(
        session,
        detector,
        Box::new(BoxAnnotator::default()),
        sink,
        quit,
        Box::new(StatusLineLogger::new()),
    );
    use_case.run().map_err(Failure::setup)
}

fn build_detector(data_dir: Option<&Path>) -> Result<FaceEyeDetector, Box<dyn std::error::Error>> {
    let paths = data_resolver::resolve_cascades(data_dir)?;
    let config = DetectionConfig::default();
    log::info!("Loading cascades from {}", paths.face.display());

    let face = HaarCascadeClassifier::load(&paths.face, &config)?;
    let left_eye = HaarCascadeClassifier::load(&paths.left_eye, &config)?;
    let right_eye = HaarCascadeClassifier::load(&paths.right_eye, &config)?;
    Ok(FaceEyeDetector::new(
        Box::new(face),
        Box::new(left_eye),
        Box::new(right_eye),
        config,
    ))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.timeout_ms == 0 {
        return Err("Timeout must be greater than 0 ms".into());
    }
    if cli.device < 0 {
        return Err(format!("Device index must not be negative, got {}", cli.device).into());
    }
    Ok(())
}
