use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Task priority, inferred once when the task is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    /// Present in the schema but never assigned by the extraction
    /// heuristics; machine-created tasks start at medium or above.
    Low,
}

impl Priority {
    /// Parse a priority label, defaulting to `Medium` for anything
    /// unrecognized.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => Priority::High,
            "low" => Priority::Low,
            _ => Priority::Medium,
        }
    }

    /// Lowercase label used in notification bodies and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// Provenance channel of a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Scanned mailbox message.
    Email,
    /// Scanned chat message.
    Chat,
    /// Scanned call transcript.
    Call,
    /// Meeting notes or manually ingested text.
    Notes,
}

/// The two named task groupings. Membership is decided once, at
/// insertion time, and never re-evaluated as dates pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bucket {
    Today,
    Longterm,
}

impl Bucket {
    /// Placement rule: `Longterm` iff a due date exists and is strictly
    /// after `today`; no due date or a due date on/before `today` goes
    /// to `Today`.
    pub fn for_due(due: Option<NaiveDate>, today: NaiveDate) -> Self {
        match due {
            Some(d) if d > today => Bucket::Longterm,
            _ => Bucket::Today,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Bucket::Today => "today",
            Bucket::Longterm => "longterm",
        }
    }
}

// =============================================================================
// Structs
// =============================================================================

/// A single action item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Opaque unique identifier, immutable once created.
    pub id: String,
    /// Verb-first title, at most 120 characters.
    pub text: String,
    pub priority: Priority,
    /// Optional due date (ISO 8601 on disk).
    pub due: Option<NaiveDate>,
    /// Mutated only by the store consumer (UI), never by the scan core.
    pub done: bool,
    /// Creation timestamp, epoch milliseconds.
    pub created: i64,
    /// True for machine-created tasks.
    pub auto: bool,
    pub source: SourceKind,
    /// Free-text provenance (channel / sender / subject), audit only.
    #[serde(rename = "sourceDetail")]
    pub source_detail: String,
}

impl Task {
    /// Build a machine-created task with a fresh id and creation stamp.
    ///
    /// Text is truncated to the 120-character schema limit.
    pub fn new_auto(
        text: &str,
        priority: Priority,
        due: Option<NaiveDate>,
        source: SourceKind,
        source_detail: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            text: truncate_chars(text, 120),
            priority,
            due,
            done: false,
            created: Utc::now().timestamp_millis(),
            auto: true,
            source,
            source_detail: source_detail.to_string(),
        }
    }
}

/// The full two-bucket task list, as persisted by the store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskBook {
    #[serde(default)]
    pub today: Vec<Task>,
    #[serde(default)]
    pub longterm: Vec<Task>,
}

impl TaskBook {
    /// Iterate over every task in both buckets, today first.
    pub fn all(&self) -> impl Iterator<Item = &Task> {
        self.today.iter().chain(self.longterm.iter())
    }

    pub fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<Task> {
        match bucket {
            Bucket::Today => &mut self.today,
            Bucket::Longterm => &mut self.longterm,
        }
    }

    /// Case-insensitive exact-match test against every stored task text.
    pub fn contains_text(&self, text: &str) -> bool {
        let needle = text.to_lowercase();
        self.all().any(|t| t.text.to_lowercase() == needle)
    }

    pub fn len(&self) -> usize {
        self.today.len() + self.longterm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.today.is_empty() && self.longterm.is_empty()
    }
}

/// One extractor output, prior to deduplication and merge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
}

/// Identity of the person whose commitments are being tracked.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Full name as it appears in messages, e.g. "Dana Whitfield".
    pub full_name: String,
    /// Mailbox address, used to recognize self-sent messages.
    pub email: String,
    /// Chat handle, used to recognize self-sent chat messages.
    pub chat_handle: String,
    /// Trusted mail domain; mail from outside it is routed to the
    /// ingest queue instead of the deterministic extractor.
    pub internal_domain: String,
}

impl UserProfile {
    /// First token of the full name, matched as a standalone signal.
    pub fn first_name(&self) -> &str {
        self.full_name.split_whitespace().next().unwrap_or("")
    }
}

/// Truncate to at most `max` characters on a char boundary.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_priority_from_label() {
        assert_eq!(Priority::from_label("high"), Priority::High);
        assert_eq!(Priority::from_label("HIGH"), Priority::High);
        assert_eq!(Priority::from_label("low"), Priority::Low);
        assert_eq!(Priority::from_label("medium"), Priority::Medium);
        assert_eq!(Priority::from_label("urgent-ish"), Priority::Medium);
        assert_eq!(Priority::from_label(""), Priority::Medium);
    }

    #[test]
    fn test_priority_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        assert_eq!(
            serde_json::to_string(&Priority::Medium).unwrap(),
            "\"medium\""
        );
    }

    #[test]
    fn test_source_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SourceKind::Email).unwrap(), "\"email\"");
        assert_eq!(serde_json::to_string(&SourceKind::Chat).unwrap(), "\"chat\"");
        assert_eq!(serde_json::to_string(&SourceKind::Call).unwrap(), "\"call\"");
        assert_eq!(serde_json::to_string(&SourceKind::Notes).unwrap(), "\"notes\"");
    }

    #[test]
    fn test_bucket_no_due_goes_today() {
        assert_eq!(Bucket::for_due(None, date(2026, 3, 4)), Bucket::Today);
    }

    #[test]
    fn test_bucket_due_today_goes_today() {
        let today = date(2026, 3, 4);
        assert_eq!(Bucket::for_due(Some(today), today), Bucket::Today);
    }

    #[test]
    fn test_bucket_due_tomorrow_goes_longterm() {
        let today = date(2026, 3, 4);
        assert_eq!(
            Bucket::for_due(Some(date(2026, 3, 5)), today),
            Bucket::Longterm
        );
    }

    #[test]
    fn test_bucket_due_past_goes_today() {
        let today = date(2026, 3, 4);
        assert_eq!(Bucket::for_due(Some(date(2026, 3, 1)), today), Bucket::Today);
    }

    #[test]
    fn test_task_new_auto_defaults() {
        let task = Task::new_auto(
            "Reply to Mika about the rollout",
            Priority::Medium,
            None,
            SourceKind::Chat,
            "#launch",
        );
        assert!(!task.id.is_empty());
        assert!(task.auto);
        assert!(!task.done);
        assert!(task.created > 0);
        assert_eq!(task.source, SourceKind::Chat);
        assert_eq!(task.source_detail, "#launch");
    }

    #[test]
    fn test_task_new_auto_truncates_text() {
        let long = "x".repeat(300);
        let task = Task::new_auto(&long, Priority::Medium, None, SourceKind::Notes, "");
        assert_eq!(task.text.chars().count(), 120);
    }

    #[test]
    fn test_task_ids_are_unique() {
        let a = Task::new_auto("One thing", Priority::Medium, None, SourceKind::Email, "");
        let b = Task::new_auto("One thing", Priority::Medium, None, SourceKind::Email, "");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_task_json_field_names() {
        let task = Task::new_auto(
            "Send the deck",
            Priority::High,
            Some(date(2026, 3, 6)),
            SourceKind::Email,
            "Weekly sync — Jordan Lee",
        );
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["sourceDetail"], "Weekly sync — Jordan Lee");
        assert_eq!(json["due"], "2026-03-06");
        assert_eq!(json["priority"], "high");
        assert_eq!(json["source"], "email");
    }

    #[test]
    fn test_task_null_due_round_trips() {
        let task = Task::new_auto("Send the deck", Priority::Medium, None, SourceKind::Email, "");
        let json = serde_json::to_string(&task).unwrap();
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back.due, None);
    }

    #[test]
    fn test_task_book_contains_text_case_insensitive() {
        let mut book = TaskBook::default();
        book.today.push(Task::new_auto(
            "Reply to Mike about X",
            Priority::Medium,
            None,
            SourceKind::Chat,
            "",
        ));
        assert!(book.contains_text("reply to mike about x"));
        assert!(book.contains_text("REPLY TO MIKE ABOUT X"));
        assert!(!book.contains_text("reply to mike about y"));
    }

    #[test]
    fn test_task_book_contains_text_checks_both_buckets() {
        let mut book = TaskBook::default();
        book.longterm.push(Task::new_auto(
            "Draft the renewal proposal",
            Priority::Medium,
            None,
            SourceKind::Email,
            "",
        ));
        assert!(book.contains_text("draft the renewal proposal"));
    }

    #[test]
    fn test_task_book_missing_fields_default_empty() {
        let book: TaskBook = serde_json::from_str("{}").unwrap();
        assert!(book.is_empty());
        let book: TaskBook = serde_json::from_str(r#"{"today": []}"#).unwrap();
        assert!(book.longterm.is_empty());
    }

    #[test]
    fn test_user_profile_first_name() {
        let user = UserProfile {
            full_name: "Dana Whitfield".to_string(),
            email: "dana@corgi.dev".to_string(),
            chat_handle: "@dana".to_string(),
            internal_domain: "corgi.dev".to_string(),
        };
        assert_eq!(user.first_name(), "Dana");
    }

    #[test]
    fn test_truncate_chars_boundary() {
        assert_eq!(truncate_chars("abcdef", 4), "abcd");
        assert_eq!(truncate_chars("abc", 4), "abc");
        // Multi-byte chars count as one.
        assert_eq!(truncate_chars("é é é", 3), "é é");
    }
}
