//! In-memory snapshot storage
//!
//! Volatile backend for tests and embedded use. Data is lost when the
//! process exits.

use crate::{Store, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;

/// In-memory storage backend
pub struct MemoryStore {
    snapshots: DashMap<(String, String), String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            snapshots: DashMap::new(),
        }
    }

    /// Number of stored snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn save(&self, namespace: &str, name: &str, json: &str) -> Result<(), StoreError> {
        self.snapshots
            .insert((namespace.to_string(), name.to_string()), json.to_string());
        Ok(())
    }

    async fn load(&self, namespace: &str, name: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .snapshots
            .get(&(namespace.to_string(), name.to_string()))
            .map(|entry| entry.value().clone()))
    }

    async fn remove(&self, namespace: &str, name: &str) -> Result<bool, StoreError> {
        Ok(self
            .snapshots
            .remove(&(namespace.to_string(), name.to_string()))
            .is_some())
    }

    async fn exists(&self, namespace: &str, name: &str) -> Result<bool, StoreError> {
        Ok(self
            .snapshots
            .contains_key(&(namespace.to_string(), name.to_string())))
    }
}
