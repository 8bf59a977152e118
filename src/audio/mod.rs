//! Audio input: the source trait, file/pipe sources, and live capture.

pub mod source;
pub mod wav;

#[cfg(feature = "cpal-audio")]
pub mod capture;

pub use source::{AudioSource, FramePhase, MockAudioSource};
pub use wav::WavAudioSource;

#[cfg(feature = "cpal-audio")]
pub use capture::CpalAudioSource;
