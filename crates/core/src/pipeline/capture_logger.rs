use std::collections::HashMap;
use std::io::{self, Write};
use std::time::Instant;

use super::frame_counts::FrameCounts;

/// Cross-cutting logger for capture loop events.
///
/// Keeps console/status concerns out of the loop itself so tests can run
/// it silently.
pub trait CaptureLogger: Send {
    /// Report running totals; called once per loop iteration.
    fn progress(&mut self, counts: &FrameCounts);

    /// Record how long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Log a problem the loop recovered from.
    fn error(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullCaptureLogger;

impl CaptureLogger for NullCaptureLogger {
    fn progress(&mut self, _counts: &FrameCounts) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn info(&mut self, _message: &str) {}
    fn error(&mut self, _message: &str) {}
}

/// Console logger: rewrites a single status line on stdout every
/// iteration and reports per-stage timings at the end.
pub struct StatusLineLogger {
    timings: HashMap<String, Vec<f64>>,
    start_time: Instant,
    last: FrameCounts,
}

impl StatusLineLogger {
    pub fn new() -> Self {
        Self {
            timings: HashMap::new(),
            start_time: Instant::now(),
            last: FrameCounts::default(),
        }
    }

    /// Carriage return plus counts, so each write overwrites the last.
    pub fn status_line(counts: &FrameCounts) -> String {
        format!("\r{counts}")
    }

    pub fn summary_string(&self) -> String {
        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Capture summary ({} depth, {} colour frames, {elapsed_s:.1}s):",
            self.last.depth, self.last.color
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = if durations.is_empty() {
                0.0
            } else {
                total_ms / durations.len() as f64
            };
            lines.push(format!(
                "  {stage:12}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms"
            ));
        }

        if elapsed_s > 0.0 {
            let fps = self.last.color as f64 / elapsed_s;
            lines.push(format!("  Colour rate: {fps:.1} fps"));
        }

        lines.join("\n")
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }
}

impl Default for StatusLineLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureLogger for StatusLineLogger {
    fn progress(&mut self, counts: &FrameCounts) {
        self.last = *counts;
        let mut out = io::stdout().lock();
        let _ = write!(out, "{}", Self::status_line(counts));
        let _ = out.flush();
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn error(&mut self, message: &str) {
        log::error!("{message}");
    }

    fn summary(&self) {
        // Ends the status line before the log output.
        println!();
        log::info!("{}", self.summary_string());
    }
}
