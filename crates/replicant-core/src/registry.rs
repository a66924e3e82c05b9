//! Registry - process-wide (namespace, name) -> Replicant mapping
//!
//! Owns declare-once semantics: the first successful declaration creates
//! the record and is the only point where `default_value`, `persistent`,
//! and the validator take effect. Records live until process shutdown;
//! a session disconnect never destroys one.

use crate::error::{Error, Result};
use crate::replicant::{AssignmentAck, Broadcast, Replicant, Validate};
use dashmap::DashMap;
use replicant_storage::{PersistHandle, Persister, Store};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Options applied on first declaration only; ignored on re-declares
pub struct DeclareOptions {
    pub default_value: Option<Value>,
    pub persistent: bool,
    pub validator: Option<Arc<dyn Validate>>,
}

impl Default for DeclareOptions {
    fn default() -> Self {
        Self {
            default_value: None,
            persistent: true,
            validator: None,
        }
    }
}

impl DeclareOptions {
    pub fn with_default(default_value: Value) -> Self {
        Self {
            default_value: Some(default_value),
            ..Self::default()
        }
    }

    pub fn ephemeral() -> Self {
        Self {
            persistent: false,
            ..Self::default()
        }
    }

    pub fn ephemeral_with_default(default_value: Value) -> Self {
        Self {
            default_value: Some(default_value),
            persistent: false,
            validator: None,
        }
    }
}

/// Process-wide registry of authoritative records
pub struct Registry {
    replicants: DashMap<(String, String), Arc<Replicant>>,
    store: Option<Arc<dyn Store>>,
    persist: Option<PersistHandle>,
    broadcast_tx: broadcast::Sender<Broadcast>,
}

impl Registry {
    /// In-memory registry without durable persistence
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(10000);
        Self {
            replicants: DashMap::new(),
            store: None,
            persist: None,
            broadcast_tx,
        }
    }

    /// Registry backed by a snapshot store; spawns the coalescing
    /// persistence writer. Must be called within a tokio runtime.
    pub fn with_store(store: Arc<dyn Store>) -> Self {
        let (broadcast_tx, _) = broadcast::channel(10000);
        let persist = Persister::spawn(store.clone());
        Self {
            replicants: DashMap::new(),
            store: Some(store),
            persist: Some(persist),
            broadcast_tx,
        }
    }

    /// The sole construction entry point for records, reachable
    /// equivalently from the in-process context and remote sessions.
    pub async fn declare(
        &self,
        namespace: &str,
        name: &str,
        opts: DeclareOptions,
    ) -> Result<Arc<Replicant>> {
        // Checked before any I/O so callers can catch it synchronously.
        if name.is_empty() {
            return Err(Error::MissingName);
        }

        let key = (namespace.to_string(), name.to_string());
        if let Some(existing) = self.replicants.get(&key) {
            debug!(namespace = %namespace, name = %name, "Re-declare attaches to existing record");
            return Ok(existing.value().clone());
        }

        let initial = self.initial_value(namespace, name, &opts).await?;
        let persist = if opts.persistent {
            self.persist.clone()
        } else {
            None
        };

        let record = Arc::new(Replicant::new(
            namespace.to_string(),
            name.to_string(),
            opts.persistent,
            initial,
            opts.validator,
            persist,
            self.broadcast_tx.clone(),
        ));

        // A racing declare may have created the record while we loaded
        // the snapshot; the first one in wins.
        let record = self
            .replicants
            .entry(key)
            .or_insert(record)
            .value()
            .clone();

        info!(
            namespace = %namespace,
            name = %name,
            persistent = record.persistent(),
            "Replicant declared"
        );
        Ok(record)
    }

    async fn initial_value(
        &self,
        namespace: &str,
        name: &str,
        opts: &DeclareOptions,
    ) -> Result<Value> {
        if opts.persistent {
            if let Some(store) = &self.store {
                if let Some(json) = store.load(namespace, name).await? {
                    return serde_json::from_str(&json).map_err(|source| {
                        Error::Deserialization {
                            namespace: namespace.to_string(),
                            name: name.to_string(),
                            source,
                        }
                    });
                }
            }
        }

        Ok(opts
            .default_value
            .clone()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new())))
    }

    /// Get an existing record handle, if any
    pub fn get(&self, namespace: &str, name: &str) -> Option<Arc<Replicant>> {
        self.replicants
            .get(&(namespace.to_string(), name.to_string()))
            .map(|entry| entry.value().clone())
    }

    /// One-shot snapshot read. Creates no record, no subscription, and
    /// fires no events; an unknown name is simply `None`.
    pub fn read(&self, namespace: &str, name: &str) -> Option<Value> {
        self.get(namespace, name).map(|record| record.value())
    }

    /// Whole-value replacement against an already-declared record
    pub fn assign(&self, namespace: &str, name: &str, new_value: Value) -> Result<AssignmentAck> {
        let record = self.get(namespace, name).ok_or_else(|| Error::NotFound {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })?;
        record.assign(new_value)
    }

    /// Read-only directory of declared records: namespace -> name -> handle
    pub fn declared(&self) -> BTreeMap<String, BTreeMap<String, Arc<Replicant>>> {
        let mut directory: BTreeMap<String, BTreeMap<String, Arc<Replicant>>> = BTreeMap::new();
        for entry in self.replicants.iter() {
            let (namespace, name) = entry.key();
            directory
                .entry(namespace.clone())
                .or_default()
                .insert(name.clone(), entry.value().clone());
        }
        directory
    }

    /// Subscribe to the commit fan-out for all records
    pub fn subscribe(&self) -> broadcast::Receiver<Broadcast> {
        self.broadcast_tx.subscribe()
    }

    /// Registry statistics
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            replicant_count: self.replicants.len(),
            subscriber_count: self.broadcast_tx.receiver_count(),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry statistics
#[derive(Debug, Clone)]
pub struct RegistryStats {
    pub replicant_count: usize,
    pub subscriber_count: usize,
}
