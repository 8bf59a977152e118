use crate::defaults;
use crate::error::{Result, VoxlineError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
#[cfg(feature = "cli")]
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub audio: AudioConfig,
    pub session: SessionConfig,
}

/// Recognition model configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ModelConfig {
    /// Path of the model directory to load.
    pub path: Option<String>,
    /// Directory scanned for installed model directories.
    pub models_dir: Option<String>,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
}

/// Recognition session configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Capacity of the capture-to-decode chunk queue.
    pub queue_capacity: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            queue_capacity: defaults::CHUNK_QUEUE_CAPACITY,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Missing fields use default values.
    ///
    /// # Errors
    /// `ConfigFileNotFound` when the file is missing, `Config` when the TOML
    /// does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VoxlineError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                VoxlineError::Io(e)
            }
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Load configuration from a file, falling back to defaults if the file
    /// does not exist. A file that exists but fails to parse is still an
    /// error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(VoxlineError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Supported variables:
    /// - VOXLINE_MODEL → model.path
    /// - VOXLINE_MODELS_DIR → model.models_dir
    /// - VOXLINE_AUDIO_DEVICE → audio.device
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(path) = std::env::var("VOXLINE_MODEL")
            && !path.is_empty()
        {
            self.model.path = Some(path);
        }

        if let Ok(dir) = std::env::var("VOXLINE_MODELS_DIR")
            && !dir.is_empty()
        {
            self.model.models_dir = Some(dir);
        }

        if let Ok(device) = std::env::var("VOXLINE_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        self
    }

    /// Default configuration file path: ~/.config/voxline/config.toml on
    /// Linux.
    #[cfg(feature = "cli")]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("voxline").join("config.toml"))
    }
}
