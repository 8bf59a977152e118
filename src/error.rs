//! Error types for voxline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoxlineError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Model and recognizer lifecycle errors
    #[error("Model not found at {path}")]
    ModelNotFound { path: String },

    #[error("Failed to load model at {path}: {message}")]
    ModelLoad { path: String, message: String },

    #[error("Failed to create recognizer: {message}")]
    RecognizerCreate { message: String },

    // Session errors
    #[error("Session is not active: {message}")]
    SessionNotActive { message: String },

    #[error("No model selected")]
    NoModelSelected,

    // Result parsing errors
    #[error("Malformed recognition result: {message}")]
    MalformedResult { message: String },

    // Audio capture errors
    #[error("No audio input device available: {device}")]
    NoAudioDevice { device: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, VoxlineError>;
