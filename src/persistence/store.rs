//! File-based configuration store

use crate::core::error::{Result, WorkflowError};
use crate::persistence::{validate_key, ConfigStore};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

const ENTRY_EXTENSION: &str = "json";

/// One `<key>.json` file per entry in a directory
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    dir: PathBuf,
}

impl FileConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the local data directory
    pub fn with_default_path() -> Self {
        let data_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(data_dir.join("gha-generator").join("configs"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.{}", key, ENTRY_EXTENSION)))
    }
}

#[async_trait::async_trait]
impl ConfigStore for FileConfigStore {
    async fn save(&self, key: &str, json: &str) -> Result<()> {
        let path = self.entry_path(key)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| WorkflowError::resource(&self.dir, e))?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| WorkflowError::resource(&path, e))?;
        debug!("Stored {}", path.display());
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(WorkflowError::resource(&path, e)),
        }
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(WorkflowError::resource(&self.dir, e)),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| WorkflowError::resource(&self.dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }
            if let Some(key) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(key.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let path = self.entry_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(WorkflowError::resource(&path, e)),
        }
    }
}
