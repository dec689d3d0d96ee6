//! Snapshot storage backends
//!
//! A snapshot is an opaque byte blob addressed by namespace
//! (`"<app>::balances"`). The store owns the encoding.

use crate::error::PersistenceError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::Debug;
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::NamedTempFile;
use tracing::debug;

/// Key-value persistence for engine snapshots
pub trait SnapshotStorage: Debug + Send + Sync {
    /// Stored snapshot, or `None` when nothing was written yet
    fn read(&self, namespace: &str) -> Result<Option<Vec<u8>>, PersistenceError>;

    fn write(&self, namespace: &str, bytes: &[u8]) -> Result<(), PersistenceError>;
}

/// One JSON file per namespace inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `tidewatch::pools::v3` is stored as `tidewatch__pools__v3.json`
    pub fn path_for(&self, namespace: &str) -> PathBuf {
        let file_name: String = namespace
            .replace("::", "__")
            .chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => c,
                _ => '_',
            })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }

    fn io_error(namespace: &str, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            namespace: namespace.to_string(),
            source,
        }
    }
}

impl SnapshotStorage for FileStorage {
    fn read(&self, namespace: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        match fs::read(self.path_for(namespace)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Self::io_error(namespace, err)),
        }
    }

    fn write(&self, namespace: &str, bytes: &[u8]) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir).map_err(|err| Self::io_error(namespace, err))?;

        // Each write gets its own temp file in the same directory, so
        // concurrent writers never rename each other's files away
        let path = self.path_for(namespace);
        let mut temp =
            NamedTempFile::new_in(&self.dir).map_err(|err| Self::io_error(namespace, err))?;
        temp.write_all(bytes).map_err(|err| Self::io_error(namespace, err))?;
        temp.persist(&path).map_err(|err| Self::io_error(namespace, err.error))?;

        debug!("Wrote {} byte snapshot to {:?}", bytes.len(), path);
        Ok(())
    }
}

/// In-process storage for tests and embedders without a disk
#[derive(Debug, Default)]
pub struct MemoryStorage {
    snapshots: Mutex<HashMap<String, Vec<u8>>>,
    writes: Mutex<usize>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a snapshot, as if written by an earlier run
    pub fn insert(&self, namespace: &str, bytes: impl Into<Vec<u8>>) {
        self.snapshots.lock().insert(namespace.to_string(), bytes.into());
    }

    pub fn get(&self, namespace: &str) -> Option<Vec<u8>> {
        self.snapshots.lock().get(namespace).cloned()
    }

    /// Number of successful `write` calls so far
    pub fn write_count(&self) -> usize {
        *self.writes.lock()
    }

    /// Make every `read` fail with an I/O error until switched back
    pub fn fail_reads(&self, failing: bool) {
        self.fail_reads.store(failing, Ordering::SeqCst);
    }

    /// Make every `write` fail with an I/O error until switched back
    pub fn fail_writes(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    fn unavailable(namespace: &str) -> PersistenceError {
        PersistenceError::Io {
            namespace: namespace.to_string(),
            source: io::Error::new(ErrorKind::Other, "storage unavailable"),
        }
    }
}

impl SnapshotStorage for MemoryStorage {
    fn read(&self, namespace: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::unavailable(namespace));
        }
        Ok(self.get(namespace))
    }

    fn write(&self, namespace: &str, bytes: &[u8]) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::unavailable(namespace));
        }
        self.insert(namespace, bytes);
        *self.writes.lock() += 1;
        Ok(())
    }
}
