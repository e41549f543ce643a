//! Model store: fitted parameters as a JSON file at a fixed path.
//!
//! The schema is defined by `models::ModelSnapshot`.

use std::fs::{File, create_dir_all};
use std::path::PathBuf;

use crate::error::AppError;
use crate::models::ModelSnapshot;

pub const DEFAULT_MODEL_PATH: &str = "models/rate_predictor.json";

/// Persistence port for fitted model parameters.
pub trait ModelStore: Send + Sync {
    /// Human-readable location for logs.
    fn location(&self) -> String;

    /// The stored snapshot, or `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<ModelSnapshot>, AppError>;

    fn save(&self, snapshot: &ModelSnapshot) -> Result<(), AppError>;
}

#[derive(Debug, Clone)]
pub struct JsonModelStore {
    path: PathBuf,
}

impl JsonModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ModelStore for JsonModelStore {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Option<ModelSnapshot>, AppError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let file = File::open(&self.path).map_err(|e| {
            AppError::io(format!("Failed to open model '{}': {e}", self.path.display()))
        })?;
        let snapshot = serde_json::from_reader(file)
            .map_err(|e| AppError::data(format!("Invalid model JSON: {e}")))?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &ModelSnapshot) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir_all(parent).map_err(|e| {
                AppError::io(format!("Failed to create '{}': {e}", parent.display()))
            })?;
        }
        let file = File::create(&self.path).map_err(|e| {
            AppError::io(format!("Failed to create model '{}': {e}", self.path.display()))
        })?;
        serde_json::to_writer_pretty(file, snapshot)
            .map_err(|e| AppError::io(format!("Failed to write model JSON: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RegressorKind;
    use crate::models::ParamBlock;

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonModelStore::new(dir.path().join("models").join("m.json"));
        assert_eq!(store.load().unwrap(), None);

        let snapshot = ModelSnapshot {
            kind: RegressorKind::Linear,
            samples: 3,
            training_loss: 0.25,
            blocks: vec![ParamBlock {
                name: "betas".to_string(),
                rows: 2,
                cols: 1,
                values: vec![1.5, -0.5],
            }],
        };
        store.save(&snapshot).unwrap();
        assert_eq!(store.load().unwrap(), Some(snapshot));
    }

    #[test]
    fn corrupt_file_is_a_data_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = JsonModelStore::new(&path).load().unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
