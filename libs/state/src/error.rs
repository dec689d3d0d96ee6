//! Engine error types

use std::time::Duration;
use thiserror::Error;

/// Failure of a single watcher; retried with backoff
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WatchError {
    #[error("Fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Watch stream closed")]
    StreamClosed,

    #[error("Watch task panicked")]
    Panicked,
}

/// Snapshot storage failure; logged and swallowed by the store
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Storage I/O failed for {namespace}: {source}")]
    Io {
        namespace: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Malformed persisted snapshot; the whole snapshot is discarded
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Key(#[from] KeyError),
}

/// Canonical key string that does not parse
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid key {key:?}: {reason}")]
pub struct KeyError {
    pub key: String,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Engine loop terminated abnormally: {0}")]
    EngineTask(String),
}
