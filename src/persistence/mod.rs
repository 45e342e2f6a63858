//! Persistence of configurations for later regeneration

pub mod store;

pub use store::FileConfigStore;

use crate::core::config::WorkflowConfig;
use crate::core::error::{Result, WorkflowError};
use crate::core::Workflow;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Trait for configuration store backends
///
/// Entries are JSON documents under a flat key space.
#[async_trait::async_trait]
pub trait ConfigStore: Send + Sync {
    /// Save (or overwrite) an entry
    async fn save(&self, key: &str, json: &str) -> Result<()>;

    /// Load an entry, `None` when absent
    async fn load(&self, key: &str) -> Result<Option<String>>;

    /// Keys in sorted order
    async fn list(&self) -> Result<Vec<String>>;

    /// Delete an entry; returns whether it existed
    async fn delete(&self, key: &str) -> Result<bool>;
}

/// Reject keys that could escape the store
pub fn validate_key(key: &str) -> Result<()> {
    let invalid = key.trim().is_empty()
        || key.contains('/')
        || key.contains('\\')
        || key.contains("..");
    if invalid {
        return Err(WorkflowError::Store(format!("invalid configuration name '{}'", key)));
    }
    Ok(())
}

/// In-memory store (for testing or ephemeral use)
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    entries: tokio::sync::RwLock<BTreeMap<String, String>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn save(&self, key: &str, json: &str) -> Result<()> {
        validate_key(key)?;
        self.entries.write().await.insert(key.to_string(), json.to_string());
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn list(&self) -> Result<Vec<String>> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        Ok(self.entries.write().await.remove(key).is_some())
    }
}

/// Named configurations and workflows on top of a [`ConfigStore`]
#[derive(Clone)]
pub struct WorkflowRegistry {
    store: Arc<dyn ConfigStore>,
}

impl WorkflowRegistry {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    pub async fn save_config(&self, name: &str, config: &WorkflowConfig) -> Result<()> {
        self.store.save(name, &config.to_json()?).await?;
        info!("Configuration saved as '{}'", name);
        Ok(())
    }

    pub async fn recall_config(&self, name: &str) -> Result<Option<WorkflowConfig>> {
        match self.store.load(name).await? {
            Some(json) => Ok(Some(WorkflowConfig::from_json(&json)?)),
            None => Ok(None),
        }
    }

    /// Save a generated workflow in its serialized form
    pub async fn save(&self, name: &str, workflow: &Workflow) -> Result<()> {
        self.store.save(name, &workflow.to_json()?).await?;
        info!("Workflow '{}' saved as '{}'", workflow.name(), name);
        Ok(())
    }

    pub async fn recall(&self, name: &str) -> Result<Option<Workflow>> {
        match self.store.load(name).await? {
            Some(json) => Ok(Some(Workflow::from_json(&json)?)),
            None => Ok(None),
        }
    }

    /// Raw stored JSON of an entry
    pub async fn show(&self, name: &str) -> Result<Option<String>> {
        self.store.load(name).await
    }

    pub async fn list(&self) -> Result<Vec<String>> {
        self.store.list().await
    }

    pub async fn delete(&self, name: &str) -> Result<bool> {
        self.store.delete(name).await
    }
}
