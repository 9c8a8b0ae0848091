//! Candidate-to-store merging.
//!
//! Takes one extractor candidate plus provenance, deduplicates against
//! everything already stored, and commits at most one new task. This is
//! an at-least-once idempotency boundary, not a hard schema constraint:
//! the external agent path writes the same store and can still race a
//! near-duplicate in.

use chrono::NaiveDate;
use tracing::info;

use scout_core::error::Result;
use scout_core::types::{truncate_chars, Bucket, Candidate, SourceKind, Task};
use scout_storage::TaskStore;

/// What happened to one candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    Added(Bucket),
    DuplicateSkipped,
    EmptyText,
}

/// Merge one candidate into the store.
///
/// Loads the full current book, skips the candidate when its text
/// exactly matches (case-insensitive) any existing task in either
/// bucket, and otherwise appends a fresh auto task to the bucket chosen
/// by due-date comparison against `today`, persisting atomically.
pub fn merge_candidate(
    store: &TaskStore,
    candidate: &Candidate,
    source: SourceKind,
    source_detail: &str,
    today: NaiveDate,
) -> Result<MergeOutcome> {
    let text = candidate.text.trim();
    if text.is_empty() {
        return Ok(MergeOutcome::EmptyText);
    }
    // The store schema caps titles at 120 characters.
    let text = truncate_chars(text, 120);

    let bucket = Bucket::for_due(candidate.due_date, today);

    let mut book = store.load()?;
    if book.contains_text(&text) {
        info!(
            source = ?source,
            "duplicate skipped: {}",
            truncate_chars(&text, 60)
        );
        return Ok(MergeOutcome::DuplicateSkipped);
    }

    let task = Task::new_auto(&text, candidate.priority, candidate.due_date, source, source_detail);
    info!(
        source = ?source,
        bucket = bucket.name(),
        priority = task.priority.label(),
        "task added: {}",
        truncate_chars(&text, 80)
    );
    book.bucket_mut(bucket).push(task);
    store.save(&book)?;

    Ok(MergeOutcome::Added(bucket))
}
