//! Error reporting from the recording worker threads.
//!
//! The capture and decode workers run detached from the controller, so their
//! failures cannot surface as return values. They go through an
//! [`ErrorReporter`] instead, carrying the typed [`VoxlineError`] and whether
//! the run survives it.

use crate::error::VoxlineError;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Which recording worker raised a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Worker {
    /// Reads the audio source and queues chunks.
    Capture,
    /// Feeds the recognizer and reconciles the transcript.
    Decode,
    /// Pushes snapshots to the transcript sink.
    Sink,
}

impl fmt::Display for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Worker::Capture => "capture",
            Worker::Decode => "decode",
            Worker::Sink => "sink",
        };
        f.write_str(name)
    }
}

/// A problem raised while recording, with the typed error attached.
///
/// Fatal reports mean the worker is shutting down and the run will end;
/// warnings mean it recovered and kept going.
#[derive(Debug)]
pub struct WorkerReport {
    pub worker: Worker,
    pub error: VoxlineError,
    pub fatal: bool,
}

impl WorkerReport {
    /// A recoverable condition; the worker keeps going.
    pub fn warning(worker: Worker, error: VoxlineError) -> Self {
        Self {
            worker,
            error,
            fatal: false,
        }
    }

    /// A condition the worker cannot continue past.
    pub fn fatal(worker: Worker, error: VoxlineError) -> Self {
        Self {
            worker,
            error,
            fatal: true,
        }
    }
}

impl fmt::Display for WorkerReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fatal {
            write!(f, "{} worker failed: {}", self.worker, self.error)
        } else {
            write!(f, "{} worker: {}", self.worker, self.error)
        }
    }
}

/// Receives worker reports. Implementations are called from the worker
/// threads, never from the controller's own thread.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, report: &WorkerReport);
}

/// Default reporter: everything to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, report: &WorkerReport) {
        eprintln!("voxline: {report}");
    }
}

/// One report kept by [`CollectingReporter`], with the error flattened to
/// its display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedReport {
    pub worker: Worker,
    pub fatal: bool,
    pub message: String,
}

/// Reporter that retains every report for later inspection.
///
/// Cloning shares the underlying store, so a clone handed to the controller
/// stays readable from the caller.
#[derive(Clone, Default)]
pub struct CollectingReporter {
    reports: Arc<Mutex<Vec<RecordedReport>>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All reports received so far, in arrival order.
    pub fn reports(&self) -> Vec<RecordedReport> {
        self.reports
            .lock()
            .map(|reports| reports.clone())
            .unwrap_or_default()
    }

    /// Number of non-fatal reports from the given worker.
    pub fn warning_count(&self, worker: Worker) -> usize {
        self.reports()
            .iter()
            .filter(|report| report.worker == worker && !report.fatal)
            .count()
    }

    /// Whether any fatal report arrived.
    pub fn saw_fatal(&self) -> bool {
        self.reports().iter().any(|report| report.fatal)
    }
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, report: &WorkerReport) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(RecordedReport {
                worker: report.worker,
                fatal: report.fatal,
                message: report.error.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_display_distinguishes_severity() {
        let warning = WorkerReport::warning(
            Worker::Capture,
            VoxlineError::AudioCapture {
                message: "chunk queue full".to_string(),
            },
        );
        assert_eq!(
            warning.to_string(),
            "capture worker: Audio capture failed: chunk queue full"
        );

        let fatal = WorkerReport::fatal(
            Worker::Decode,
            VoxlineError::Other("session lock poisoned".to_string()),
        );
        assert!(fatal.to_string().starts_with("decode worker failed:"));
    }

    #[test]
    fn test_collecting_reporter_keeps_arrival_order() {
        let reporter = CollectingReporter::new();
        reporter.report(&WorkerReport::warning(
            Worker::Capture,
            VoxlineError::Other("first".to_string()),
        ));
        reporter.report(&WorkerReport::fatal(
            Worker::Decode,
            VoxlineError::Other("second".to_string()),
        ));

        let reports = reporter.reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].worker, Worker::Capture);
        assert!(!reports[0].fatal);
        assert_eq!(reports[1].worker, Worker::Decode);
        assert!(reports[1].fatal);
    }

    #[test]
    fn test_collecting_reporter_counts() {
        let reporter = CollectingReporter::new();
        assert_eq!(reporter.warning_count(Worker::Capture), 0);
        assert!(!reporter.saw_fatal());

        reporter.report(&WorkerReport::warning(
            Worker::Capture,
            VoxlineError::Other("a".to_string()),
        ));
        reporter.report(&WorkerReport::warning(
            Worker::Sink,
            VoxlineError::Other("b".to_string()),
        ));
        reporter.report(&WorkerReport::fatal(
            Worker::Capture,
            VoxlineError::Other("c".to_string()),
        ));

        assert_eq!(reporter.warning_count(Worker::Capture), 1);
        assert_eq!(reporter.warning_count(Worker::Sink), 1);
        assert!(reporter.saw_fatal());
    }

    #[test]
    fn test_clone_shares_the_store() {
        let reporter = CollectingReporter::new();
        let handle = reporter.clone();
        handle.report(&WorkerReport::warning(
            Worker::Decode,
            VoxlineError::Other("shared".to_string()),
        ));
        assert_eq!(reporter.reports().len(), 1);
    }
}
