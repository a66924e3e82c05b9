//! Replicant Storage Backends
//!
//! Durable snapshot storage for persistent replicants:
//! - File (default): one JSON snapshot file per record
//! - Memory: fast, volatile storage for tests and embedded use
//!
//! Snapshots are keyed by `(namespace, name)` and hold the exact compact
//! JSON serialization of the record's value, nothing else.

pub mod file;
pub mod memory;
pub mod persist;

use async_trait::async_trait;

/// Storage backend trait for replicant snapshots
#[async_trait]
pub trait Store: Send + Sync {
    /// Write a snapshot, overwriting any prior content for this record
    async fn save(&self, namespace: &str, name: &str, json: &str) -> Result<(), StoreError>;

    /// Load a snapshot. A missing snapshot is `None`, not an error.
    async fn load(&self, namespace: &str, name: &str) -> Result<Option<String>, StoreError>;

    /// Remove a snapshot, returning whether one existed
    async fn remove(&self, namespace: &str, name: &str) -> Result<bool, StoreError>;

    /// Check whether a snapshot exists
    async fn exists(&self, namespace: &str, name: &str) -> Result<bool, StoreError>;
}

/// Storage error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Invalid snapshot key: {0}")]
    InvalidKey(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

pub use file::FileStore;
pub use memory::MemoryStore;
pub use persist::{PersistHandle, Persister};
