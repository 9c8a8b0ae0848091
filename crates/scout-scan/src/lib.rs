//! Scan orchestration and ingestion.
//!
//! Polls the configured message sources, filters out non-actionable
//! content per channel, routes uncertain content to the ingest queue,
//! and merges extracted candidates into the task store exactly once
//! per source message.

pub mod call;
pub mod chat;
pub mod context;
pub mod filters;
pub mod mail;
pub mod merge;
pub mod orchestrator;
pub mod reminders;
pub mod sources;

pub use context::ScanContext;
pub use orchestrator::{ScanOrchestrator, ScanState, ScanStatus};
pub use reminders::ReminderService;
