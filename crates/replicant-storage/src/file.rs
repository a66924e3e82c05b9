//! File-backed snapshot storage
//!
//! One file per persistent record at `root/<namespace>/<name>.rep`. The
//! file body is the exact compact JSON serialization of the record's
//! value with no envelope, so external tools can read it directly.

use crate::{Store, StoreError};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// File extension for replicant snapshots
pub const SNAPSHOT_EXT: &str = "rep";

/// File-backed storage rooted at a directory
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The snapshot path for a record
    pub fn snapshot_path(&self, namespace: &str, name: &str) -> PathBuf {
        self.root
            .join(namespace)
            .join(format!("{}.{}", name, SNAPSHOT_EXT))
    }

    fn checked_path(&self, namespace: &str, name: &str) -> Result<PathBuf, StoreError> {
        validate_segment(namespace)?;
        validate_segment(name)?;
        Ok(self.snapshot_path(namespace, name))
    }
}

/// Reject key segments that would escape the store root or collide on disk
fn validate_segment(segment: &str) -> Result<(), StoreError> {
    if segment.is_empty() {
        return Err(StoreError::InvalidKey("empty key segment".into()));
    }
    if segment.contains(['/', '\\']) || segment == "." || segment == ".." {
        return Err(StoreError::InvalidKey(segment.to_string()));
    }
    Ok(())
}

#[async_trait]
impl Store for FileStore {
    async fn save(&self, namespace: &str, name: &str, json: &str) -> Result<(), StoreError> {
        let path = self.checked_path(namespace, name)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write to a sibling temp file, then rename over the snapshot, so
        // a crash mid-write never leaves a torn file behind.
        let tmp = path.with_extension(format!("{}.tmp", SNAPSHOT_EXT));
        tokio::fs::write(&tmp, json.as_bytes()).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(path = %path.display(), bytes = json.len(), "Snapshot written");
        Ok(())
    }

    async fn load(&self, namespace: &str, name: &str) -> Result<Option<String>, StoreError> {
        let path = self.checked_path(namespace, name)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, namespace: &str, name: &str) -> Result<bool, StoreError> {
        let path = self.checked_path(namespace, name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, namespace: &str, name: &str) -> Result<bool, StoreError> {
        let path = self.checked_path(namespace, name)?;
        Ok(path.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_load_exact_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store
            .save("test-bundle", "position", r#"{"nested":"hey we assigned!"}"#)
            .await
            .unwrap();

        let raw = tokio::fs::read_to_string(store.snapshot_path("test-bundle", "position"))
            .await
            .unwrap();
        assert_eq!(raw, r#"{"nested":"hey we assigned!"}"#);

        let loaded = store.load("test-bundle", "position").await.unwrap();
        assert_eq!(loaded.as_deref(), Some(r#"{"nested":"hey we assigned!"}"#));
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert!(store.load("ns", "nothing").await.unwrap().is_none());
        assert!(!store.exists("ns", "nothing").await.unwrap());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.save("ns", "rep", r#""first""#).await.unwrap();
        store.save("ns", "rep", r#""second""#).await.unwrap();

        assert_eq!(
            store.load("ns", "rep").await.unwrap().as_deref(),
            Some(r#""second""#)
        );
    }

    #[tokio::test]
    async fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.save("ns", "rep", "1").await.unwrap();
        assert!(store.remove("ns", "rep").await.unwrap());
        assert!(!store.remove("ns", "rep").await.unwrap());
        assert!(!store.exists("ns", "rep").await.unwrap());
    }

    #[tokio::test]
    async fn test_rejects_traversal_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert!(store.save("..", "rep", "1").await.is_err());
        assert!(store.save("ns", "a/b", "1").await.is_err());
        assert!(store.load("", "rep").await.is_err());
    }
}
