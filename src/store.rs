// Whole-document JSON persistence

use crate::error::StoreError;
use fs2::FileExt;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info, warn};

/// Whole-document read/write keyed by name
///
/// There is no partial update: callers read a document, change it and write it
/// back. Concurrent read-modify-write cycles on the same name are not
/// serialized, so the last writer wins.
pub trait DocumentStore {
    /// Read a document; `Ok(None)` when it does not exist
    fn read(&self, name: &str) -> Result<Option<Value>, StoreError>;

    /// Replace a document with `value`
    fn write(&self, name: &str, value: &Value) -> Result<(), StoreError>;

    /// Read a document that must be a JSON array
    fn read_collection(&self, name: &str) -> Result<Option<Vec<Value>>, StoreError> {
        match self.read(name)? {
            None => Ok(None),
            Some(Value::Array(records)) => Ok(Some(records)),
            Some(_) => Err(StoreError::NotACollection { name: name.to_string() }),
        }
    }

    /// Replace a document with an array of records
    fn write_collection(&self, name: &str, records: &[Value]) -> Result<(), StoreError> {
        self.write(name, &Value::Array(records.to_vec()))
    }
}

/// Documents stored as pretty-printed JSON files in one directory
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Open or create a store rooted at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).map_err(|source| StoreError::Io {
            name: base_path.display().to_string(),
            source,
        })?;
        debug!(path = ?base_path, "Opened document store");
        Ok(Self { base_path })
    }

    /// Get the base path of this store
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn document_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        validate_name(name)?;
        Ok(self.base_path.join(name))
    }
}

impl DocumentStore for FileStore {
    fn read(&self, name: &str) -> Result<Option<Value>, StoreError> {
        let path = self.document_path(name)?;

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(name, "Document not found");
                return Ok(None);
            }
            Err(source) => {
                return Err(StoreError::Io {
                    name: name.to_string(),
                    source,
                });
            }
        };

        let value = serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            name: name.to_string(),
            source,
        })?;
        debug!(name, bytes = content.len(), "Read document");
        Ok(Some(value))
    }

    fn write(&self, name: &str, value: &Value) -> Result<(), StoreError> {
        let path = self.document_path(name)?;
        let io_err = |source| StoreError::Io {
            name: name.to_string(),
            source,
        };

        let content = serde_json::to_string_pretty(value).map_err(|source| StoreError::Parse {
            name: name.to_string(),
            source,
        })?;

        // Advisory lock so two writers never interleave the temp-file swap
        let lock_path = self.base_path.join(format!(".{}.lock", name));
        let lock = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(io_err)?;
        lock.lock_exclusive().map_err(io_err)?;

        let tmp_path = self
            .base_path
            .join(format!(".{}.{}.tmp", name, uuid::Uuid::now_v7().simple()));

        let result = (|| -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
            drop(file);
            fs::rename(&tmp_path, &path)
        })();

        // Lock is released when `lock` is dropped
        if let Err(source) = result {
            let _ = fs::remove_file(&tmp_path);
            return Err(io_err(source));
        }

        info!(name, bytes = content.len(), "Wrote document");
        Ok(())
    }
}

/// In-memory documents for tests and demos
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document
    pub fn with_document(self, name: &str, value: Value) -> Self {
        if let Ok(mut documents) = self.documents.write() {
            documents.insert(name.to_string(), value);
        }
        self
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, name: &str) -> Result<Option<Value>, StoreError> {
        validate_name(name)?;
        let documents = self.documents.read().map_err(|_| poisoned(name))?;
        Ok(documents.get(name).cloned())
    }

    fn write(&self, name: &str, value: &Value) -> Result<(), StoreError> {
        validate_name(name)?;
        let mut documents = self.documents.write().map_err(|_| poisoned(name))?;
        documents.insert(name.to_string(), value.clone());
        Ok(())
    }
}

fn poisoned(name: &str) -> StoreError {
    StoreError::Io {
        name: name.to_string(),
        source: std::io::Error::other("document lock poisoned"),
    }
}

/// Validate a document name for use as a file name
fn validate_name(name: &str) -> Result<(), StoreError> {
    let invalid = |reason: &str| {
        Err(StoreError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };

    if name.trim().is_empty() {
        return invalid("name cannot be empty");
    }
    if name.len() > 128 {
        return invalid("name too long (max 128 chars)");
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return invalid("name cannot contain path separators or '..'");
    }
    if name.starts_with('.') {
        return invalid("name cannot start with '.'");
    }
    if name.chars().any(|c| c.is_control()) {
        return invalid("name cannot contain control characters");
    }
    Ok(())
}
