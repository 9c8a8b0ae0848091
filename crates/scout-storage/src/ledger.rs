//! The processed-message ledger.
//!
//! An idempotency set of opaque `{channel}_{native_id}` strings, kept
//! in memory and persisted as a JSON array. Growth is bounded: only the
//! most recent entries are kept, oldest truncated first, which means a
//! sufficiently old message can in principle be reprocessed. That drift
//! is accepted rather than tracked with more state.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

use scout_core::error::{Result, ScoutError};

struct LedgerInner {
    /// Insertion order, oldest first -- the eviction order.
    order: Vec<String>,
    seen: HashSet<String>,
}

/// Capped idempotency record of already-processed source messages.
pub struct ProcessedLedger {
    path: PathBuf,
    cap: usize,
    inner: Mutex<LedgerInner>,
}

impl ProcessedLedger {
    /// Load the ledger from disk, starting empty when the file is
    /// missing or unreadable.
    pub fn open(path: &Path, cap: usize) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let order: Vec<String> = match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(error = %e, "ledger file unreadable -- starting empty");
                Vec::new()
            }),
            Err(_) => Vec::new(),
        };
        let seen = order.iter().cloned().collect();

        Ok(Self {
            path: path.to_path_buf(),
            cap,
            inner: Mutex::new(LedgerInner { order, seen }),
        })
    }

    /// Whether a message id has already been processed.
    pub fn contains(&self, id: &str) -> bool {
        match self.inner.lock() {
            Ok(inner) => inner.seen.contains(id),
            // A poisoned lock degrades to "not seen": worst case one
            // message is reprocessed, which the dedup layer absorbs.
            Err(_) => false,
        }
    }

    /// Record a message id as processed and persist the capped list.
    ///
    /// Recording an id that is already present is a no-op.
    pub fn mark(&self, id: &str) -> Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| ScoutError::Ledger(format!("lock poisoned: {}", e)))?;
        let inner = &mut *guard;

        if !inner.seen.insert(id.to_string()) {
            return Ok(());
        }
        inner.order.push(id.to_string());

        if inner.order.len() > self.cap {
            let excess = inner.order.len() - self.cap;
            for old in inner.order.drain(..excess) {
                inner.seen.remove(&old);
            }
        }

        let content = serde_json::to_string(&inner.order)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|i| i.order.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Compose the ledger id for a message: `{channel}_{native_id}`.
pub fn message_id(channel: &str, native_id: &str) -> String {
    format!("{}_{}", channel, native_id)
}
