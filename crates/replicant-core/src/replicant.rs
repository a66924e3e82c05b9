//! The Replicant record and its commit pipeline
//!
//! A `Replicant` is the authoritative copy of one named, revisioned,
//! optionally persisted JSON value. All mutation goes through the commit
//! pipeline: apply the op batch, bump the revision exactly once, notify
//! local listeners synchronously, enqueue persistence, broadcast to
//! subscriber sessions.

use crate::diff::diff;
use crate::error::{Error, Result};
use crate::ops::ChangeOp;
use crate::value;
use parking_lot::{Mutex, RwLock};
use replicant_storage::PersistHandle;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Notification fired on every committed mutation
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub old_value: Value,
    pub new_value: Value,
    pub operations: Vec<ChangeOp>,
    pub revision: u64,
}

/// Acknowledgment returned to the originator of a whole-value assignment
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentAck {
    pub new_value: Value,
    pub revision: u64,
}

/// Fan-out message delivered to subscriber sessions
#[derive(Debug, Clone)]
pub enum Broadcast {
    Change {
        namespace: String,
        name: String,
        old_value: Value,
        new_value: Value,
        operations: Vec<ChangeOp>,
        revision: u64,
    },
}

/// Optional validation hook applied before a candidate value is committed
pub trait Validate: Send + Sync {
    fn validate(&self, value: &Value) -> std::result::Result<(), String>;
}

type ChangeListener = Box<dyn Fn(&ChangeEvent) + Send + Sync>;

struct State {
    value: Value,
    revision: u64,
}

/// The authoritative (namespace, name) record
pub struct Replicant {
    namespace: String,
    name: String,
    persistent: bool,
    state: RwLock<State>,
    /// Serializes commits to this record; commits to different records
    /// proceed concurrently.
    commit_lock: Mutex<()>,
    listeners: RwLock<Vec<ChangeListener>>,
    validator: Option<Arc<dyn Validate>>,
    persist: Option<PersistHandle>,
    broadcast: broadcast::Sender<Broadcast>,
}

impl Replicant {
    pub(crate) fn new(
        namespace: String,
        name: String,
        persistent: bool,
        initial: Value,
        validator: Option<Arc<dyn Validate>>,
        persist: Option<PersistHandle>,
        broadcast: broadcast::Sender<Broadcast>,
    ) -> Self {
        Self {
            namespace,
            name,
            persistent,
            state: RwLock::new(State {
                value: initial,
                revision: 0,
            }),
            commit_lock: Mutex::new(()),
            listeners: RwLock::new(Vec::new()),
            validator,
            persist,
            broadcast,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fixed at first declaration; later declarations cannot change it
    pub fn persistent(&self) -> bool {
        self.persistent
    }

    /// True once any context has created this record; records live for
    /// the process lifetime, so a handle always refers to a declared one.
    pub fn declared(&self) -> bool {
        true
    }

    /// Current revision; bumped by exactly 1 per committed mutation
    pub fn revision(&self) -> u64 {
        self.state.read().revision
    }

    /// Snapshot of the current value
    pub fn value(&self) -> Value {
        self.state.read().value.clone()
    }

    /// Value and revision read under one lock, so the pair stays
    /// consistent under concurrent commits
    pub fn snapshot(&self) -> (Value, u64) {
        let state = self.state.read();
        (state.value.clone(), state.revision)
    }

    /// Register a listener invoked synchronously on every commit, after
    /// the mutation is visible. Listeners must not mutate this record.
    pub fn on_change(&self, listener: impl Fn(&ChangeEvent) + Send + Sync + 'static) {
        self.listeners.write().push(Box::new(listener));
    }

    /// Record a single scalar/subtree replacement at a dotted path
    pub fn set(&self, path: &str, new_value: Value) -> Result<u64> {
        self.transact(|txn| txn.set(path, new_value))
    }

    /// Append one element to the sequence at a dotted path
    pub fn push(&self, path: &str, item: Value) -> Result<u64> {
        self.transact(|txn| txn.push(path, item))
    }

    /// Remove `delete_count` elements at `index` and insert `items`
    pub fn splice(
        &self,
        path: &str,
        index: usize,
        delete_count: usize,
        items: Vec<Value>,
    ) -> Result<u64> {
        self.transact(|txn| txn.splice(path, index, delete_count, items))
    }

    /// Batch several edits into one commit with an ordered op list and a
    /// single revision bump. An empty batch commits nothing.
    pub fn transact<F>(&self, f: F) -> Result<u64>
    where
        F: FnOnce(&mut Transaction) -> Result<()>,
    {
        let _guard = self.commit_lock.lock();

        let mut txn = Transaction {
            working: self.state.read().value.clone(),
            ops: Vec::new(),
        };
        f(&mut txn)?;

        if txn.ops.is_empty() {
            return Ok(self.state.read().revision);
        }

        self.check(&txn.working)?;
        Ok(self.commit(txn.working, txn.ops))
    }

    /// Whole-value replacement. Change ops for subscribers come from the
    /// diff engine; the returned ack is scoped to the caller, which is by
    /// definition the originator.
    pub fn assign(&self, new_value: Value) -> Result<AssignmentAck> {
        let _guard = self.commit_lock.lock();

        self.check(&new_value)?;
        let old_value = self.state.read().value.clone();
        let operations = diff(&old_value, &new_value);
        let revision = self.commit(new_value.clone(), operations);

        Ok(AssignmentAck {
            new_value,
            revision,
        })
    }

    fn check(&self, candidate: &Value) -> Result<()> {
        if let Some(validator) = &self.validator {
            validator
                .validate(candidate)
                .map_err(Error::SchemaRejected)?;
        }
        Ok(())
    }

    /// The commit pipeline. Caller must hold `commit_lock`.
    fn commit(&self, new_value: Value, operations: Vec<ChangeOp>) -> u64 {
        let (old_value, revision) = {
            let mut state = self.state.write();
            let old = std::mem::replace(&mut state.value, new_value.clone());
            state.revision += 1;
            (old, state.revision)
        };

        let event = ChangeEvent {
            old_value,
            new_value,
            operations,
            revision,
        };

        // Local listeners observe the commit before this call returns.
        for listener in self.listeners.read().iter() {
            listener(&event);
        }

        if self.persistent {
            if let Some(persist) = &self.persist {
                let json = serde_json::to_string(&event.new_value)
                    .unwrap_or_else(|_| "null".to_string());
                persist.enqueue(&self.namespace, &self.name, json);
            }
        }

        let _ = self.broadcast.send(Broadcast::Change {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            old_value: event.old_value,
            new_value: event.new_value,
            operations: event.operations,
            revision,
        });

        debug!(
            namespace = %self.namespace,
            name = %self.name,
            revision = revision,
            "Committed mutation"
        );
        revision
    }
}

impl std::fmt::Debug for Replicant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Replicant")
            .field("namespace", &self.namespace)
            .field("name", &self.name)
            .field("persistent", &self.persistent)
            .field("revision", &state.revision)
            .finish()
    }
}

/// A pending batch of edits against a working copy of the value
pub struct Transaction {
    working: Value,
    ops: Vec<ChangeOp>,
}

impl Transaction {
    /// Read from the working copy, including edits made earlier in this
    /// transaction
    pub fn get(&self, path: &str) -> Option<&Value> {
        value::get_path(&self.working, path)
    }

    pub fn set(&mut self, path: &str, new_value: Value) -> Result<()> {
        let old_value = value::get_path(&self.working, path)
            .cloned()
            .unwrap_or(Value::Null);
        value::set_path(&mut self.working, path, new_value.clone())?;
        self.ops.push(ChangeOp::update(path, old_value, new_value));
        Ok(())
    }

    pub fn push(&mut self, path: &str, item: Value) -> Result<()> {
        let arr = value::get_array_mut(&mut self.working, path)?;
        let index = arr.len();
        arr.push(item.clone());
        self.ops.push(ChangeOp::splice(path, index, vec![], vec![item]));
        Ok(())
    }

    pub fn splice(
        &mut self,
        path: &str,
        index: usize,
        delete_count: usize,
        items: Vec<Value>,
    ) -> Result<()> {
        let arr = value::get_array_mut(&mut self.working, path)?;
        if index > arr.len() {
            return Err(Error::InvalidPath(format!(
                "splice index {} out of bounds at '{}'",
                index, path
            )));
        }

        let end = (index + delete_count).min(arr.len());
        let removed: Vec<Value> = arr.splice(index..end, items.iter().cloned()).collect();
        self.ops.push(ChangeOp::splice(path, index, removed, items));
        Ok(())
    }

    /// Remove a contiguous range from the sequence at `path`
    pub fn remove(&mut self, path: &str, index: usize, count: usize) -> Result<()> {
        self.splice(path, index, count, Vec::new())
    }
}
