//! Rule-set persistence backends.
//!
//! [`StorageBackend`] is the persistence collaborator: load the stored rule
//! set once at startup, save it after every mutation. Two implementations
//! ship here:
//!
//! - [`MemoryStorage`]: shared in-memory slot, for tests and hosts without a
//!   disk. Clones share the same slot.
//! - [`FileStorage`]: pretty-printed JSON, written atomically through a
//!   sibling temp file and a rename.

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use autoview_core::RuleSetSnapshot;
use thiserror::Error;
use tracing::debug;

/// Errors from loading or saving the rule set.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("rule storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("rule storage JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("rule storage unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence collaborator for the rule set.
pub trait StorageBackend {
    /// Load the stored rule set, or `None` if nothing was ever saved.
    fn load(&self) -> StorageResult<Option<RuleSetSnapshot>>;

    /// Replace the stored rule set.
    fn save(&mut self, snapshot: &RuleSetSnapshot) -> StorageResult<()>;

    /// Move unreadable stored data out of the way so the next save does not
    /// destroy it. Returns where it went, if anywhere.
    fn quarantine(&mut self) -> StorageResult<Option<PathBuf>> {
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MemorySlot {
    snapshot: Option<RuleSetSnapshot>,
    saves: u64,
    fail_saves: bool,
}

/// In-memory backend. Cloning yields another handle to the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Rc<RefCell<MemorySlot>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-populated with a stored rule set.
    #[must_use]
    pub fn with_snapshot(snapshot: RuleSetSnapshot) -> Self {
        let storage = Self::default();
        storage.slot.borrow_mut().snapshot = Some(snapshot);
        storage
    }

    /// Make every subsequent save fail (or succeed again).
    pub fn set_fail_saves(&self, fail: bool) {
        self.slot.borrow_mut().fail_saves = fail;
    }

    /// Last successfully saved rule set.
    #[must_use]
    pub fn stored(&self) -> Option<RuleSetSnapshot> {
        self.slot.borrow().snapshot.clone()
    }

    /// Number of successful saves.
    #[must_use]
    pub fn save_count(&self) -> u64 {
        self.slot.borrow().saves
    }
}

impl StorageBackend for MemoryStorage {
    fn load(&self) -> StorageResult<Option<RuleSetSnapshot>> {
        Ok(self.slot.borrow().snapshot.clone())
    }

    fn save(&mut self, snapshot: &RuleSetSnapshot) -> StorageResult<()> {
        let mut slot = self.slot.borrow_mut();
        if slot.fail_saves {
            return Err(StorageError::Unavailable("memory storage set to fail".into()));
        }
        slot.snapshot = Some(snapshot.clone());
        slot.saves += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileStorage
// ---------------------------------------------------------------------------

/// JSON file backend.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where [`StorageBackend::quarantine`] moves an unreadable file.
    #[must_use]
    pub fn corrupt_path(&self) -> PathBuf {
        self.sibling(".corrupt")
    }

    fn temp_path(&self) -> PathBuf {
        self.sibling(".tmp")
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl StorageBackend for FileStorage {
    fn load(&self) -> StorageResult<Option<RuleSetSnapshot>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored rule set");
                return Ok(None);
            }
            Err(err) => return Err(self.io_error(err)),
        };
        let snapshot = serde_json::from_slice(&bytes)?;
        Ok(Some(snapshot))
    }

    fn save(&mut self, snapshot: &RuleSetSnapshot) -> StorageResult<()> {
        let json = serde_json::to_vec_pretty(snapshot)?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let tmp = self.temp_path();
        fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        debug!(path = %self.path.display(), "rule set saved");
        Ok(())
    }

    fn quarantine(&mut self) -> StorageResult<Option<PathBuf>> {
        let target = self.corrupt_path();
        match fs::rename(&self.path, &target) {
            Ok(()) => Ok(Some(target)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(self.io_error(err)),
        }
    }
}
