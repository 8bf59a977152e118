//! Decoding engine seam.
//!
//! The acoustic decoding engine is an external capability consumed through
//! the narrow traits in [`decoder`]. A scripted mock lives in [`mock`], the
//! Vosk-backed implementation in [`vosk`] (behind the `vosk` feature).

pub mod decoder;
pub mod mock;
pub mod vosk;

pub use decoder::{EngineModel, EngineRecognizer, SpeechEngine};
pub use mock::{EngineProbe, MockEngine, ScriptStep};
pub use vosk::VoskEngine;
