//! voxline - Offline streaming speech recognition
//!
//! Core session machinery for feeding PCM audio into an offline recognizer
//! and reconciling its partial/final results into a line-oriented transcript.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod events;
#[cfg(feature = "cli")]
pub mod output;
pub mod parser;
pub mod report;
pub mod session;
pub mod sink;
pub mod transcript;

// Core traits (source → session → sink)
pub use audio::source::AudioSource;
pub use engine::decoder::{EngineModel, EngineRecognizer, SpeechEngine};
pub use sink::{CollectorSink, StdoutSink, TranscriptSink};

// Session lifecycle
pub use session::{
    ControllerConfig, ControllerState, ModelHandle, RecognizerSession, SessionController,
    SessionState, scan_models,
};
pub use transcript::TranscriptStream;

// Error handling
pub use error::{Result, VoxlineError};
pub use report::{
    CollectingReporter, ErrorReporter, LogReporter, RecordedReport, Worker, WorkerReport,
};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.3.1+abc1234"` when git hash is available, `"0.3.1"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }

    #[test]
    fn version_string_contains_plus_when_git_hash_present() {
        let ver = version_string();
        if option_env!("GIT_HASH").is_some_and(|h| !h.is_empty()) {
            assert!(
                ver.contains('+'),
                "With GIT_HASH set, version should contain '+', got: {}",
                ver
            );
        } else {
            assert_eq!(ver, env!("CARGO_PKG_VERSION"));
        }
    }
}
