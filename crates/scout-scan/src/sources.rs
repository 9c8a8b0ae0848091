//! Collaborator seams for external systems.
//!
//! The network and protocol clients that actually talk to a mailbox, a
//! chat workspace, a call-recording service, or a notification channel
//! live outside this crate. Scanners and reminder timers see only these
//! traits; the composition root wires concrete implementations in.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use scout_core::error::Result;

/// One retrieved mailbox message, headers already decoded.
#[derive(Clone, Debug)]
pub struct MailMessage {
    /// Native message id, unique within the mailbox.
    pub message_id: String,
    pub subject: String,
    /// Display form, e.g. `Jordan Lee <jordan@corgihq.com>`.
    pub sender: String,
    /// Plain-text body. Header lines must not be included; they create
    /// false-positive name matches downstream.
    pub body: String,
}

/// One retrieved chat message.
#[derive(Clone, Debug)]
pub struct ChatMessage {
    /// Native timestamp id, unique within the workspace.
    pub ts: String,
    /// Channel name without the leading `#`.
    pub channel: String,
    pub sender: String,
    pub text: String,
    pub posted_at: DateTime<Utc>,
}

/// One retrieved call with its flattened transcript.
#[derive(Clone, Debug)]
pub struct CallRecord {
    pub call_id: String,
    pub title: String,
    /// One line per utterance, `Speaker: text`. May be empty when the
    /// transcript is not (yet) available.
    pub transcript: String,
}

/// Retrieves recent mailbox messages.
#[async_trait]
pub trait MailSource: Send + Sync {
    /// Most recent messages from the last `lookback_days` days, capped
    /// at `limit`, newest last.
    async fn fetch_recent(&self, lookback_days: i64, limit: usize) -> Result<Vec<MailMessage>>;
}

/// Retrieves recent chat messages mentioning the tracked person.
#[async_trait]
pub trait ChatSource: Send + Sync {
    async fn fetch_recent(&self) -> Result<Vec<ChatMessage>>;
}

/// Retrieves recent calls and their transcripts.
#[async_trait]
pub trait CallSource: Send + Sync {
    async fn fetch_recent(&self, lookback_hours: i64) -> Result<Vec<CallRecord>>;
}

/// Outbound notification delivery: best-effort, fire-and-forget, one
/// implementation per channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel label for logs, e.g. "mail" or "chat".
    fn channel(&self) -> &str;

    async fn notify(&self, subject: &str, body: &str) -> Result<()>;
}
