//! Shared scan state.
//!
//! All process-wide mutable state -- store, ledger, queue, compiled
//! extractor, wired sources -- lives in one explicitly constructed
//! context passed to scanners and the merger. Initialization is
//! load-or-empty; there is no hidden global.

use std::path::Path;
use std::sync::Arc;

use chrono::{Local, NaiveDate};

use scout_core::config::ScoutConfig;
use scout_core::error::Result;
use scout_core::types::UserProfile;
use scout_extract::Extractor;
use scout_storage::{IngestQueue, ProcessedLedger, SignalFiles, TaskStore};

use crate::sources::{CallSource, ChatSource, MailSource};

pub struct ScanContext {
    pub config: ScoutConfig,
    pub user: UserProfile,
    pub store: Arc<TaskStore>,
    pub ledger: Arc<ProcessedLedger>,
    pub queue: Arc<IngestQueue>,
    pub signals: Arc<SignalFiles>,
    pub extractor: Arc<Extractor>,
    pub mail: Option<Arc<dyn MailSource>>,
    pub chat: Option<Arc<dyn ChatSource>>,
    pub calls: Option<Arc<dyn CallSource>>,
}

impl ScanContext {
    /// Build the context from configuration, creating the on-disk
    /// artifacts under `data_dir` as needed. No sources are wired;
    /// attach them with the `with_*` builders.
    pub fn new(config: ScoutConfig, data_dir: &Path) -> Result<Self> {
        let storage = &config.storage;
        let store = Arc::new(TaskStore::new(&storage.tasks_path(data_dir))?);
        let ledger = Arc::new(ProcessedLedger::open(
            &storage.ledger_path(data_dir),
            storage.ledger_cap,
        )?);
        let queue = Arc::new(IngestQueue::open(&storage.queue_path(data_dir))?);
        let signals = Arc::new(SignalFiles::new(
            &storage.trigger_path(data_dir),
            &storage.heartbeat_path(data_dir),
        ));
        let user = config.user.profile();
        let extractor = Arc::new(Extractor::new(&user));

        Ok(Self {
            config,
            user,
            store,
            ledger,
            queue,
            signals,
            extractor,
            mail: None,
            chat: None,
            calls: None,
        })
    }

    pub fn with_mail(mut self, source: Arc<dyn MailSource>) -> Self {
        self.mail = Some(source);
        self
    }

    pub fn with_chat(mut self, source: Arc<dyn ChatSource>) -> Self {
        self.chat = Some(source);
        self
    }

    pub fn with_calls(mut self, source: Arc<dyn CallSource>) -> Self {
        self.calls = Some(source);
        self
    }

    /// The current local calendar date -- the anchor for due-date
    /// resolution and bucket placement.
    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
