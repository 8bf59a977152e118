//! Acoustic model loading and ownership.

use crate::defaults;
use crate::engine::decoder::{EngineModel, SpeechEngine};
use crate::error::{Result, VoxlineError};
use std::path::{Path, PathBuf};

/// Owns one loaded acoustic model.
///
/// At most one model is live per session; loading a replacement releases
/// the previous one (after its dependent recognizer). Dropping the handle
/// releases the engine resource.
pub struct ModelHandle {
    model: Option<Box<dyn EngineModel>>,
    path: PathBuf,
}

impl ModelHandle {
    /// Load a model from `path` using the given engine.
    ///
    /// The path is validated for existence before the engine is asked to
    /// load, so a bad path reports `ModelNotFound` rather than a generic
    /// load failure.
    ///
    /// # Errors
    /// Returns `VoxlineError::ModelNotFound` when `path` does not exist,
    /// `VoxlineError::ModelLoad` when the engine rejects the model.
    pub fn load(engine: &dyn SpeechEngine, path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(VoxlineError::ModelNotFound {
                path: path.display().to_string(),
            });
        }

        let model = engine
            .new_model(path)
            .ok_or_else(|| VoxlineError::ModelLoad {
                path: path.display().to_string(),
                message: format!("{} engine returned no model", engine.name()),
            })?;

        Ok(Self {
            model: Some(model),
            path: path.to_path_buf(),
        })
    }

    /// The path this model was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true while the model resource is held.
    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Release the model resource. Idempotent; a second call is a no-op.
    pub fn unload(&mut self) {
        self.model = None;
    }

    pub(crate) fn engine_model(&self) -> Option<&dyn EngineModel> {
        self.model.as_deref()
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("path", &self.path)
            .field("loaded", &self.model.is_some())
            .finish()
    }
}

/// List model directories under `models_dir`.
///
/// A directory counts as a model when its name starts with
/// [`defaults::MODEL_DIR_PREFIX`]. Results are sorted by name for a stable
/// presentation order.
///
/// # Errors
/// Returns an I/O error when `models_dir` cannot be read.
pub fn scan_models(models_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut models = Vec::new();
    for entry in std::fs::read_dir(models_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let is_model = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(defaults::MODEL_DIR_PREFIX));
        if is_model {
            models.push(path);
        }
    }
    models.sort();
    Ok(models)
}
