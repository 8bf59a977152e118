//! Recognition session lifecycle: model handles, the recognizer state
//! machine, and the top-level controller.

pub mod controller;
pub mod model;
pub mod recognizer;

pub use controller::{ControllerConfig, ControllerState, SessionController};
pub use model::{ModelHandle, scan_models};
pub use recognizer::{RecognizerSession, SessionState};
