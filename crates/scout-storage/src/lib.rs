//! Durable state for the scout system.
//!
//! Three on-disk artifacts, all JSON, all owned by this crate: the
//! two-bucket task store, the processed-message ledger, and the ingest
//! queue directory handed off to the external extraction agent. Plus
//! the small signal files that coordinate with that agent.

pub mod ledger;
pub mod queue;
pub mod signals;
pub mod store;

pub use ledger::ProcessedLedger;
pub use queue::{IngestQueue, QueueItem};
pub use signals::SignalFiles;
pub use store::TaskStore;
