use std::path::PathBuf;

use async_trait::async_trait;

use super::{ActionStore, StoreError, recover_interrupted};
use crate::models::Action;

/// Whole-list JSON persistence in a single file slot.
///
/// Every save rewrites the full array, so a torn partial update can never
/// leave a half-written record behind a valid prefix.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ActionStore for JsonFileStore {
    async fn load(&self) -> Vec<Action> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                tracing::warn!(
                    "Failed to read queue file {}: {err}",
                    self.path.display()
                );
                return Vec::new();
            }
        };

        match serde_json::from_slice::<Vec<Action>>(&bytes) {
            Ok(actions) => recover_interrupted(actions),
            Err(err) => {
                // Treated as "no prior queue" rather than an error.
                tracing::warn!(
                    "Corrupt queue file {}, starting empty: {err}",
                    self.path.display()
                );
                Vec::new()
            }
        }
    }

    async fn save(&self, actions: &[Action]) -> Result<(), StoreError> {
        let json = serde_json::to_vec(actions)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}
