use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::PersistenceError;

/// Get/set of named string blobs. A missing blob is `Ok(None)`, not an error.
pub trait BlobStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

/// One `<key>.json` file per blob under `dir`, swapped in via a temp file.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: Option<PathBuf>,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// A store without a location: reads see nothing, writes fail with `NoLocation`.
    pub fn unavailable() -> Self {
        Self { dir: None }
    }

    pub fn from_dir(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    pub fn blob_path(&self, key: &str) -> Option<PathBuf> {
        let dir = self.dir.as_ref()?;
        Some(dir.join(format!("{}.json", file_stem(key))))
    }
}

impl BlobStore for FileBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let Some(path) = self.blob_path(key) else {
            return Ok(None);
        };
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(PersistenceError::Read {
                path,
                message: err.to_string(),
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let Some(path) = self.blob_path(key) else {
            return Err(PersistenceError::NoLocation);
        };
        let write_err = |path: &Path, err: std::io::Error| PersistenceError::Write {
            path: path.to_path_buf(),
            message: err.to_string(),
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|err| write_err(dir, err))?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|err| write_err(tmp.as_path(), err))?;
        fs::rename(&tmp, &path).map_err(|err| write_err(path.as_path(), err))?;
        Ok(())
    }
}

/// In-process blobs. Clones share the same contents, so a test can keep a handle and
/// inspect what was written, or make writes fail.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.lock().insert(key.to_string(), value.to_string());
        store
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.blobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.raw(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::Write {
                path: PathBuf::from(format!("memory:{key}")),
                message: "writes disabled".to_string(),
            });
        }
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn file_stem(key: &str) -> String {
    let stem: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "blob".to_string()
    } else {
        stem
    }
}
