//! Traits for the wrapped decoding engine.
//!
//! These traits mirror the engine's capability surface: load a model,
//! create a recognizer bound to that model and a sample rate, feed PCM and
//! read back raw result payloads. Constructors return `None` where the
//! engine reports failure with a null handle; mapping that to an error is
//! the session layer's job.
//!
//! Ownership encodes the lifetime rules: a recognizer can only be created
//! from a live model, and dropping a handle releases the corresponding
//! engine resource.

use std::path::Path;

/// Entry point into a decoding engine.
///
/// This trait allows swapping implementations (real Vosk vs mock).
pub trait SpeechEngine: Send + Sync {
    /// Load an acoustic model from a directory.
    ///
    /// Returns `None` when the engine rejects the model. Callers validate
    /// path existence before attempting the load.
    fn new_model(&self, path: &Path) -> Option<Box<dyn EngineModel>>;

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "engine"
    }
}

/// A loaded acoustic model.
pub trait EngineModel: Send {
    /// Create a recognizer bound to this model and a fixed sample rate.
    ///
    /// Returns `None` when the engine rejects the combination.
    fn new_recognizer(&self, sample_rate: u32) -> Option<Box<dyn EngineRecognizer>>;
}

/// A stateful decoding session.
///
/// The decoder is stateful across calls and not reentrant; callers must
/// serialize access.
pub trait EngineRecognizer: Send {
    /// Append PCM to the decoder's internal buffer.
    ///
    /// Returns `true` when an utterance boundary was detected and a final
    /// result is ready to be read with [`result`](Self::result); `false`
    /// while the utterance is still ongoing (read
    /// [`partial_result`](Self::partial_result) instead).
    fn accept_waveform(&mut self, samples: &[i16]) -> bool;

    /// Raw payload of the final result for the completed utterance.
    fn result(&mut self) -> Vec<u8>;

    /// Raw payload of the provisional result for the ongoing utterance.
    fn partial_result(&mut self) -> Vec<u8>;
}
