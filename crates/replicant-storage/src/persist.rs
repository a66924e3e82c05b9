//! Coalescing persistence writer
//!
//! Commits enqueue serialized snapshots here instead of touching the
//! store directly, keeping disk I/O off the commit path. The writer
//! drains its queue before each write pass, so a burst of commits to one
//! record collapses into a single write of the latest snapshot. A write
//! failure is logged and the stale snapshot stays on disk until the next
//! commit enqueues a fresh one.

use crate::Store;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A pending snapshot write
#[derive(Debug, Clone)]
pub struct PersistRequest {
    pub namespace: String,
    pub name: String,
    pub json: String,
}

/// Handle for enqueueing snapshot writes; cheap to clone
#[derive(Clone)]
pub struct PersistHandle {
    tx: mpsc::UnboundedSender<PersistRequest>,
}

impl PersistHandle {
    /// Queue a snapshot write. Never blocks; returns whether the writer
    /// task is still alive to receive it.
    pub fn enqueue(&self, namespace: &str, name: &str, json: String) -> bool {
        self.tx
            .send(PersistRequest {
                namespace: namespace.to_string(),
                name: name.to_string(),
                json,
            })
            .is_ok()
    }
}

/// Background writer task draining the persistence queue
pub struct Persister;

impl Persister {
    /// Spawn the writer task against a store, returning the enqueue
    /// handle. The task exits when every handle has been dropped and the
    /// queue is empty.
    pub fn spawn(store: Arc<dyn Store>) -> PersistHandle {
        let (tx, mut rx) = mpsc::unbounded_channel::<PersistRequest>();

        tokio::spawn(async move {
            while let Some(first) = rx.recv().await {
                // Drain whatever is already queued, keeping only the
                // latest snapshot per record.
                let mut latest: HashMap<(String, String), String> = HashMap::new();
                latest.insert((first.namespace, first.name), first.json);
                while let Ok(req) = rx.try_recv() {
                    latest.insert((req.namespace, req.name), req.json);
                }

                for ((namespace, name), json) in latest {
                    match store.save(&namespace, &name, &json).await {
                        Ok(()) => {
                            debug!(namespace = %namespace, name = %name, "Snapshot persisted");
                        }
                        Err(e) => {
                            warn!(
                                namespace = %namespace,
                                name = %name,
                                error = %e,
                                "Failed to persist snapshot"
                            );
                        }
                    }
                }
            }
        });

        PersistHandle { tx }
    }
}
