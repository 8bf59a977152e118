//! The recognizer session state machine.

use crate::engine::decoder::EngineRecognizer;
use crate::error::{Result, VoxlineError};
use crate::events::{AudioChunk, RecognitionEvent, ResultKind};
use crate::parser::parse_result;
use crate::session::model::ModelHandle;
use std::path::Path;

/// Lifecycle state of a [`RecognizerSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No model attached.
    Uninitialized,
    /// Model loaded, no recognizer yet.
    Ready,
    /// Recognizer created; audio can be fed.
    Active,
    /// Torn down; model and recognizer released.
    Destroyed,
}

/// One recognition session: a recognizer bound to a model and a fixed
/// sample rate.
///
/// The decoder is stateful across feed calls and not reentrant; the session
/// must be driven from one logical owner at a time. Field declaration order
/// guarantees the recognizer is dropped before its model.
pub struct RecognizerSession {
    // Declared before `model`: drop order releases the recognizer first.
    recognizer: Option<Box<dyn EngineRecognizer>>,
    model: Option<ModelHandle>,
    sample_rate: u32,
    state: SessionState,
}

impl RecognizerSession {
    /// Creates an empty session with no model attached.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            recognizer: None,
            model: None,
            sample_rate,
            state: SessionState::Uninitialized,
        }
    }

    /// Creates a session and activates it in one step.
    ///
    /// # Errors
    /// Returns `VoxlineError::RecognizerCreate` when the engine rejects the
    /// recognizer; the model handle is released before returning.
    pub fn create(model: ModelHandle, sample_rate: u32) -> Result<Self> {
        let mut session = Self::new(sample_rate);
        session.attach_model(model);
        session.activate()?;
        Ok(session)
    }

    /// Attaches a model, replacing any existing model/recognizer pair.
    ///
    /// The old recognizer is torn down before its model. The session ends up
    /// in `Ready`; call [`activate`](Self::activate) to create a recognizer.
    pub fn attach_model(&mut self, model: ModelHandle) {
        // Order matters: dependent recognizer first, then its model.
        self.recognizer = None;
        self.model = Some(model);
        self.state = SessionState::Ready;
    }

    /// Creates the recognizer, transitioning `Ready` → `Active`.
    ///
    /// A no-op when already `Active`. On failure the session stays `Ready`
    /// with its model intact; no half-constructed recognizer is retained.
    ///
    /// # Errors
    /// `VoxlineError::NoModelSelected` when no model is attached,
    /// `VoxlineError::RecognizerCreate` when the engine returns no
    /// recognizer.
    pub fn activate(&mut self) -> Result<()> {
        if self.state == SessionState::Active {
            return Ok(());
        }

        let model = self
            .model
            .as_ref()
            .filter(|m| m.is_loaded())
            .ok_or(VoxlineError::NoModelSelected)?;
        let engine_model = model
            .engine_model()
            .ok_or(VoxlineError::NoModelSelected)?;

        let recognizer = engine_model
            .new_recognizer(self.sample_rate)
            .ok_or_else(|| VoxlineError::RecognizerCreate {
                message: "engine returned no recognizer".to_string(),
            })?;

        self.recognizer = Some(recognizer);
        self.state = SessionState::Active;
        Ok(())
    }

    /// Feeds one audio chunk and returns the decoded event.
    ///
    /// The decoder buffers audio internally across calls; each call yields
    /// either a `Final` event (utterance boundary detected) or a `Partial`
    /// event (ongoing utterance).
    ///
    /// # Errors
    /// `VoxlineError::SessionNotActive` when no recognizer is active;
    /// `VoxlineError::MalformedResult` when the engine payload cannot be
    /// parsed (non-fatal — drop the event and continue).
    pub fn feed(&mut self, chunk: &AudioChunk) -> Result<RecognitionEvent> {
        let recognizer = match (self.state, self.recognizer.as_mut()) {
            (SessionState::Active, Some(recognizer)) => recognizer,
            (state, _) => {
                return Err(VoxlineError::SessionNotActive {
                    message: format!("state is {:?}", state),
                });
            }
        };

        if recognizer.accept_waveform(&chunk.samples) {
            parse_result(&recognizer.result(), ResultKind::Final)
        } else {
            parse_result(&recognizer.partial_result(), ResultKind::Partial)
        }
    }

    /// Releases the recognizer, transitioning `Active` → `Ready`.
    /// Idempotent; the model stays loaded for quick reactivation.
    pub fn deactivate(&mut self) {
        self.recognizer = None;
        if self.state == SessionState::Active {
            self.state = SessionState::Ready;
        }
    }

    /// Releases recognizer and model, in that order. Idempotent.
    pub fn destroy(&mut self) {
        self.recognizer = None;
        self.model = None;
        self.state = SessionState::Destroyed;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The fixed sample rate this session decodes at.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Path of the attached model, if any.
    pub fn model_path(&self) -> Option<&Path> {
        self.model.as_ref().map(|m| m.path())
    }
}

impl std::fmt::Debug for RecognizerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognizerSession")
            .field("state", &self.state)
            .field("sample_rate", &self.sample_rate)
            .field("model", &self.model)
            .finish()
    }
}
