//! Error types for Replicant Core

use thiserror::Error;

/// Core error types
#[derive(Error, Debug)]
pub enum Error {
    /// Stable, pattern-matchable text; callers of the original engine
    /// match on this exact message.
    #[error("Must supply a name when instantiating a Replicant")]
    MissingName,

    #[error("Replicant not found: {namespace}/{name}")]
    NotFound { namespace: String, name: String },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Persisted snapshot for {namespace}/{name} is not valid JSON: {source}")]
    Deserialization {
        namespace: String,
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Value rejected by schema: {0}")]
    SchemaRejected(String),

    #[error("Storage error: {0}")]
    Storage(#[from] replicant_storage::StoreError),
}

/// Result type alias for Replicant Core operations
pub type Result<T> = std::result::Result<T, Error>;
