//! The ingest queue.
//!
//! A directory of one-file-per-item JSON blobs awaiting the external,
//! higher-capability extraction agent. Items are write-once: after
//! handoff the core never mutates one except to delete it (success) or
//! rename it with an error suffix (failure, left for manual retry).

use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use scout_core::error::{Result, ScoutError};

const ERROR_SUFFIX: &str = "err";

/// One unit of queued work for the external agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub text: String,
    /// Human-readable provenance, e.g. "Email: Q3 planning recap".
    pub source: String,
    /// ISO 8601 enqueue time.
    pub queued_at: String,
}

/// Durable file-based work queue.
pub struct IngestQueue {
    dir: PathBuf,
}

impl IngestQueue {
    /// Open (or create) the queue directory.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write one item to the queue.
    ///
    /// Items with empty text are rejected outright; the consumer-side
    /// contract deletes such items without processing, so there is no
    /// point creating them.
    pub fn enqueue(&self, text: &str, source: &str) -> Result<PathBuf> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ScoutError::Queue("empty item text".to_string()));
        }

        let item = QueueItem {
            text: text.to_string(),
            source: source.to_string(),
            queued_at: Local::now().to_rfc3339(),
        };

        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let suffix: String = Uuid::new_v4().simple().to_string().chars().take(6).collect();
        let path = self.dir.join(format!("{}_{}.json", stamp, suffix));

        std::fs::write(&path, serde_json::to_string(&item)?)?;
        info!(
            file = %path.file_name().unwrap_or_default().to_string_lossy(),
            chars = text.chars().count(),
            source = source,
            "queued for external extraction"
        );
        Ok(path)
    }

    /// Pending items in filename (enqueue-time) order.
    pub fn pending(&self) -> Result<Vec<PathBuf>> {
        let mut items = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                items.push(path);
            }
        }
        items.sort();
        Ok(items)
    }

    /// Read an item back. Used by consumers honoring the queue
    /// contract; the producing core never calls this after handoff.
    pub fn read(&self, path: &Path) -> Result<QueueItem> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Consume an item successfully: delete it.
    pub fn complete(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path)?;
        Ok(())
    }

    /// Mark an item failed: rename it with the error suffix so it can
    /// be inspected and manually retried.
    pub fn fail(&self, path: &Path) -> Result<PathBuf> {
        let failed = path.with_extension(ERROR_SUFFIX);
        std::fs::rename(path, &failed)?;
        Ok(failed)
    }

    /// Move a failed item back into the pending set.
    pub fn requeue(&self, path: &Path) -> Result<PathBuf> {
        if path.extension().and_then(|e| e.to_str()) != Some(ERROR_SUFFIX) {
            return Err(ScoutError::Queue(format!(
                "not a failed item: {}",
                path.display()
            )));
        }
        let pending = path.with_extension("json");
        std::fs::rename(path, &pending)?;
        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue_in(dir: &tempfile::TempDir) -> IngestQueue {
        IngestQueue::open(&dir.path().join("ingest-queue")).unwrap()
    }

    #[test]
    fn test_enqueue_writes_one_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let queue = queue_in(&dir);
        let path = queue
            .enqueue("Notes from the Tuesday sync", "Notes: weekly sync")
            .unwrap();
        assert!(path.exists());
        assert_eq!(queue.pending().unwrap(), vec![path]);
    }

    #[test]
    fn test_enqueue_rejects_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let queue = queue_in(&dir);
        assert!(queue.enqueue("", "src").is_err());
        assert!(queue.enqueue("   \n", "src").is_err());
        assert!(queue.pending().unwrap().is_empty());
    }

    #[test]
    fn test_item_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let queue = queue_in(&dir);
        let path = queue.enqueue("Some transcript text", "Call: kickoff").unwrap();
        let item = queue.read(&path).unwrap();
        assert_eq!(item.text, "Some transcript text");
        assert_eq!(item.source, "Call: kickoff");
        assert!(!item.queued_at.is_empty());
    }

    #[test]
    fn test_complete_deletes_item() {
        let dir = tempfile::tempdir().unwrap();
        let queue = queue_in(&dir);
        let path = queue.enqueue("text", "src").unwrap();
        queue.complete(&path).unwrap();
        assert!(!path.exists());
        assert!(queue.pending().unwrap().is_empty());
    }

    #[test]
    fn test_fail_renames_out_of_pending() {
        let dir = tempfile::tempdir().unwrap();
        let queue = queue_in(&dir);
        let path = queue.enqueue("text", "src").unwrap();
        let failed = queue.fail(&path).unwrap();
        assert!(failed.exists());
        assert_eq!(failed.extension().unwrap(), "err");
        assert!(queue.pending().unwrap().is_empty());
    }

    #[test]
    fn test_requeue_restores_failed_item() {
        let dir = tempfile::tempdir().unwrap();
        let queue = queue_in(&dir);
        let path = queue.enqueue("text", "src").unwrap();
        let failed = queue.fail(&path).unwrap();
        let restored = queue.requeue(&failed).unwrap();
        assert_eq!(queue.pending().unwrap(), vec![restored]);
    }

    #[test]
    fn test_requeue_rejects_pending_item() {
        let dir = tempfile::tempdir().unwrap();
        let queue = queue_in(&dir);
        let path = queue.enqueue("text", "src").unwrap();
        assert!(queue.requeue(&path).is_err());
    }

    #[test]
    fn test_pending_is_sorted_by_filename() {
        let dir = tempfile::tempdir().unwrap();
        let queue = queue_in(&dir);
        // Filenames embed a second-resolution stamp; write in reverse
        // lexical order manually to prove the listing sorts.
        std::fs::write(queue.dir().join("20260102_000000_bbbbbb.json"), "{}").unwrap();
        std::fs::write(queue.dir().join("20260101_000000_aaaaaa.json"), "{}").unwrap();
        let pending = queue.pending().unwrap();
        let names: Vec<_> = pending
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "20260101_000000_aaaaaa.json".to_string(),
                "20260102_000000_bbbbbb.json".to_string()
            ]
        );
    }

    #[test]
    fn test_non_json_files_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let queue = queue_in(&dir);
        std::fs::write(queue.dir().join("stale.err"), "{}").unwrap();
        std::fs::write(queue.dir().join("README"), "hi").unwrap();
        assert!(queue.pending().unwrap().is_empty());
    }
}
