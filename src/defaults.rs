//! Default configuration constants for voxline.
//!
//! Shared constants used across configuration types and the session
//! controller, kept in one place for consistency.

use std::time::Duration;

/// Default audio sample rate in Hz.
///
/// 16kHz mono 16-bit PCM is the fixed format the recognizer is created for;
/// any other capture format must be converted before feeding.
pub const SAMPLE_RATE: u32 = 16000;

/// Default capacity of the bounded chunk queue between capture and decode.
///
/// Chunks are ~100ms each, so 64 buffers about 6 seconds of audio before
/// the capture thread starts waiting on the decoder.
pub const CHUNK_QUEUE_CAPACITY: usize = 64;

/// Interval at which the capture thread polls the audio source.
pub const POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Samples per chunk read from file-backed sources (100ms at 16kHz).
pub const CHUNK_SAMPLES: usize = 1600;

/// Consecutive read failures tolerated before the capture loop gives up.
pub const MAX_CONSECUTIVE_READ_ERRORS: u32 = 10;

/// Marker prefixed to the provisional transcript line in snapshots.
///
/// Signals "not yet final" to whatever renders the snapshot, mirroring the
/// leading ellipsis convention of dictation UIs.
pub const PROVISIONAL_MARKER: &str = "... ";

/// Directory-name prefix that identifies an acoustic model directory when
/// scanning a models root.
pub const MODEL_DIR_PREFIX: &str = "vosk-model";

/// How long `stop()` waits for worker threads to finish before detaching them.
pub const JOIN_DEADLINE: Duration = Duration::from_secs(1);
