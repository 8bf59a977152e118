//! Vosk-backed decoding engine.
//!
//! Wraps the `vosk` crate (Kaldi-based offline recognition) behind the
//! engine seam. The safe wrapper hands back typed results, so payloads are
//! re-serialized into the JSON documents the parser consumes.
//!
//! # Feature Gate
//!
//! Requires the `vosk` feature and `libvosk` at link time. Without the
//! feature a stub engine is provided that rejects every model load.

use crate::engine::decoder::{EngineModel, EngineRecognizer, SpeechEngine};
use std::path::Path;

#[cfg(feature = "vosk")]
use serde_json::json;

/// Vosk implementation of [`SpeechEngine`].
#[derive(Debug, Clone, Copy, Default)]
pub struct VoskEngine;

impl VoskEngine {
    /// Create a new Vosk engine.
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "vosk")]
impl SpeechEngine for VoskEngine {
    fn new_model(&self, path: &Path) -> Option<Box<dyn EngineModel>> {
        let model = vosk::Model::new(path.to_string_lossy().into_owned())?;
        Some(Box::new(VoskModel { model }))
    }

    fn name(&self) -> &'static str {
        "vosk"
    }
}

#[cfg(feature = "vosk")]
struct VoskModel {
    model: vosk::Model,
}

#[cfg(feature = "vosk")]
impl EngineModel for VoskModel {
    fn new_recognizer(&self, sample_rate: u32) -> Option<Box<dyn EngineRecognizer>> {
        let recognizer = vosk::Recognizer::new(&self.model, sample_rate as f32)?;
        Some(Box::new(VoskRecognizer { recognizer }))
    }
}

#[cfg(feature = "vosk")]
struct VoskRecognizer {
    recognizer: vosk::Recognizer,
}

#[cfg(feature = "vosk")]
impl EngineRecognizer for VoskRecognizer {
    fn accept_waveform(&mut self, samples: &[i16]) -> bool {
        matches!(
            self.recognizer.accept_waveform(samples),
            vosk::DecodingState::Finalized
        )
    }

    fn result(&mut self) -> Vec<u8> {
        let text = self
            .recognizer
            .result()
            .single()
            .map(|single| single.text.to_string())
            .unwrap_or_default();
        json!({ "text": text }).to_string().into_bytes()
    }

    fn partial_result(&mut self) -> Vec<u8> {
        let partial = self.recognizer.partial_result().partial.to_string();
        json!({ "partial": partial }).to_string().into_bytes()
    }
}

/// Stub implementation when the `vosk` feature is disabled.
///
/// Rejects every model load, which surfaces to callers as a model-load
/// error telling them the backend is unavailable.
#[cfg(not(feature = "vosk"))]
impl SpeechEngine for VoskEngine {
    fn new_model(&self, _path: &Path) -> Option<Box<dyn EngineModel>> {
        None
    }

    fn name(&self) -> &'static str {
        "vosk (disabled)"
    }
}
