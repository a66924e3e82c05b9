//! Replicant Core - Change Tracking and Registry
//!
//! This crate provides the core functionality of the Replicant engine:
//! - Dotted-path access into JSON value trees
//! - Minimal change operations and a recursive diff engine
//! - The `Replicant` record with revisioned, observable commits
//! - The process-wide `Registry` with declare-once semantics

pub mod diff;
pub mod error;
pub mod ops;
pub mod registry;
pub mod replicant;
pub mod session;
pub mod value;

pub use diff::diff;
pub use error::{Error, Result};
pub use ops::ChangeOp;
pub use registry::{DeclareOptions, Registry, RegistryStats};
pub use replicant::{AssignmentAck, Broadcast, ChangeEvent, Replicant, Transaction, Validate};
pub use session::SessionId;
