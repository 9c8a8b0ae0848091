//! The durable task store.
//!
//! A single pretty-printed JSON file holding the two-bucket task list.
//! Writes go to a temp file and are atomically renamed over the real
//! file, so a crash mid-write cannot corrupt the store. Load and save
//! are each serialized by their own process-wide mutex.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{error, info, warn};

use scout_core::error::{Result, ScoutError};
use scout_core::types::TaskBook;

/// Thread-safe JSON task store.
///
/// Note the known window: two concurrent read-modify-write sequences
/// can both load the same snapshot and the second save wins whole-file.
/// Scan batches run the merger sequentially per scanner, so the only
/// real overlap is across scan cycles separated by the scan interval.
pub struct TaskStore {
    path: PathBuf,
    load_lock: Mutex<()>,
    save_lock: Mutex<()>,
}

impl TaskStore {
    /// Create a store handle for the given file, ensuring the parent
    /// directory exists.
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path: path.to_path_buf(),
            load_lock: Mutex::new(()),
            save_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full task book.
    ///
    /// A missing file yields an empty book. An unparseable file is
    /// recovered from the `.corrupt` backup when that backup parses,
    /// otherwise the corrupt file is preserved under the backup name
    /// and a fresh empty book is returned. Data loss is logged, never
    /// silent.
    pub fn load(&self) -> Result<TaskBook> {
        let _guard = self
            .load_lock
            .lock()
            .map_err(|e| ScoutError::Store(format!("load lock poisoned: {}", e)))?;

        if !self.path.exists() {
            return Ok(TaskBook::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        match parse_book(&content) {
            Ok(book) => Ok(book),
            Err(e) => {
                error!(error = %e, "task store is corrupt");
                self.recover()
            }
        }
    }

    /// Persist the full task book atomically.
    pub fn save(&self, book: &TaskBook) -> Result<()> {
        let _guard = self
            .save_lock
            .lock()
            .map_err(|e| ScoutError::Store(format!("save lock poisoned: {}", e)))?;

        let tmp = self.tmp_path();
        let content = serde_json::to_string_pretty(book)?;
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn recover(&self) -> Result<TaskBook> {
        let backup = self.corrupt_path();

        // A structurally valid backup wins; restore it over the main file.
        if backup.exists() {
            if let Ok(content) = std::fs::read_to_string(&backup) {
                if let Ok(book) = parse_book(&content) {
                    info!("recovered task store from backup copy");
                    let tmp = self.tmp_path();
                    std::fs::write(&tmp, serde_json::to_string_pretty(&book)?)?;
                    std::fs::rename(&tmp, &self.path)?;
                    return Ok(book);
                }
            }
        }

        // No valid backup; stash the corrupt file for inspection.
        match std::fs::rename(&self.path, &backup) {
            Ok(()) => warn!(
                "corrupt task store preserved at {} -- starting empty",
                backup.display()
            ),
            Err(e) => warn!(error = %e, "could not preserve corrupt task store"),
        }
        Ok(TaskBook::default())
    }

    fn tmp_path(&self) -> PathBuf {
        append_extension(&self.path, "tmp")
    }

    fn corrupt_path(&self) -> PathBuf {
        append_extension(&self.path, "corrupt")
    }
}

fn parse_book(content: &str) -> Result<TaskBook> {
    if content.trim().is_empty() {
        return Err(ScoutError::Store("empty store file".to_string()));
    }
    Ok(serde_json::from_str(content)?)
}

fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(ext);
    path.with_file_name(name)
}
