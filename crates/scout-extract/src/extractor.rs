//! The action-item extraction pipeline.
//!
//! Detects commitments owed by the tracked person using name and
//! action-trigger signals, after the hard-skip cascade has discarded
//! structural noise. Output order preserves input line order; the only
//! side effect is diagnostic logging.

use std::collections::HashSet;

use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use scout_core::types::{Candidate, Priority, UserProfile};

use crate::dates;
use crate::rules::{word_count, SkipRules};

/// Compiled extraction vocabularies for one tracked person.
pub struct Extractor {
    rules: SkipRules,
    /// Full or first name outside parentheses; `None` when no name is
    /// configured, in which case only trigger matches can fire.
    name_re: Option<Regex>,
    third_person_re: Option<Regex>,
    trigger_re: Regex,
    directive_re: Regex,
    paren_re: Regex,
    urgent_re: Regex,
    pressure_re: Regex,
    bullet_re: Regex,
    whitespace_re: Regex,
}

impl Extractor {
    pub fn new(user: &UserProfile) -> Self {
        let (name_re, third_person_re) = if user.full_name.trim().is_empty() {
            (None, None)
        } else {
            let full = regex::escape(user.full_name.trim());
            let first = regex::escape(user.first_name());
            let name = Regex::new(&format!(
                r"(?i)(?:^|[\s,;:(\[@])(?:{full}|{first})(?:\b|$)"
            ))
            .expect("invalid name regex");
            let third = Regex::new(&format!(
                r"(?i)^(?:{full}|{first})\s+(?:will|is|was|has|had|can|could|would|should|may|might)\b"
            ))
            .expect("invalid third-person regex");
            (Some(name), Some(third))
        };

        Self {
            rules: SkipRules::new(),
            name_re,
            third_person_re,
            trigger_re: compile(
                r"(?i)\b(?:can you|could you|please|would you mind|i need you to|you(?:\s+will)?\s+need to|you\s+should|you\s+must|action\s+item|action:|todo:|to-?do:|follow[- ]?up|next\s+step|assigned\s+to|your\s+task|your\s+action|remind\s+you|don'?t\s+forget|make\s+sure\s+you|ensure\s+you|you\s+(?:are|were)\s+asked)\b",
            ),
            directive_re: compile(
                r"(?i)\b(?:can you|could you|please\s+(?:\w+\s+)?(?:do|send|review|confirm|check|let\s+me|update|share|schedule|submit|complete|sign|approve|prepare|create|follow|reply|respond|help|take|get|add|fix|write|provide|reach\s+out|look\s+into|look\s+at|make\s+sure|note\s+that)|action\s+item|follow[- ]?up|next\s+step|assigned)\b",
            ),
            paren_re: compile(r"\([^)]*\)"),
            urgent_re: compile(
                r"(?i)\b(?:urgent|asap|immediately|critical|blocker|p0|p1|top\s+priority)\b",
            ),
            pressure_re: compile(
                r"(?i)\b(?:important|high\s+priority|soon|today|eod|cob|end\s+of\s+day)\b",
            ),
            bullet_re: compile(r"^[-•*>\u{25cf}]+\s*"),
            whitespace_re: compile(r"\s{2,}"),
        }
    }

    /// Extract candidate action items from raw content.
    ///
    /// `source_kind` is a free-text channel label used only for
    /// diagnostics. `today` anchors due-date resolution.
    pub fn extract(&self, source_kind: &str, content: &str, today: NaiveDate) -> Vec<Candidate> {
        let lines = segment(content);
        let mut items = Vec::new();
        let mut seen_keys: HashSet<String> = HashSet::new();

        for (i, line) in lines.iter().enumerate() {
            if let Some(rule) = self.rules.first_match(line) {
                debug!(rule, source = source_kind, "line skipped");
                continue;
            }

            // Include the following line for context, e.g. a name label
            // with the actual ask on the next line.
            let ctx = match lines.get(i + 1) {
                Some(next) => format!("{} {}", line, next),
                None => line.clone(),
            };

            let has_name = self.name_matches(&ctx);
            let has_trigger = self.trigger_re.is_match(&ctx);

            if !has_name && !has_trigger {
                continue;
            }

            if has_name && !has_trigger {
                // A name appearing only inside parentheses is a role
                // label, not a directive.
                let without_parens = self.paren_re.replace_all(&ctx, " ");
                if !self.name_matches(&without_parens) {
                    continue;
                }
                // Third-person descriptions talk about the person, they
                // do not direct them.
                if let Some(third) = &self.third_person_re {
                    if third.is_match(line) {
                        continue;
                    }
                }
            }

            if has_trigger && !has_name {
                // Trigger-only lines must look like real directives,
                // not casual or marketing language.
                if !self.directive_re.is_match(line) {
                    continue;
                }
                if word_count(line) < 5 {
                    continue;
                }
            }

            let due = dates::resolve_due_date(&ctx, today);
            let priority = self.infer_priority(&ctx);
            let text = self.clean(line);

            let length = text.chars().count();
            if !(8..=300).contains(&length) {
                continue;
            }

            let key: String = text.to_lowercase().chars().take(80).collect();
            if !seen_keys.insert(key) {
                continue;
            }

            debug!(
                priority = priority.label(),
                due = ?due,
                source = source_kind,
                "candidate: {}",
                scout_core::types::truncate_chars(&text, 80)
            );
            items.push(Candidate {
                text,
                due_date: due,
                priority,
            });
        }

        items
    }

    fn name_matches(&self, text: &str) -> bool {
        self.name_re.as_ref().is_some_and(|re| re.is_match(text))
    }

    /// High on urgency vocabulary or time-pressure vocabulary, medium
    /// otherwise. Low exists in the schema but no path assigns it.
    fn infer_priority(&self, text: &str) -> Priority {
        if self.urgent_re.is_match(text) || self.pressure_re.is_match(text) {
            Priority::High
        } else {
            Priority::Medium
        }
    }

    /// Strip leading bullet glyphs, collapse whitespace runs, and
    /// capitalize the first letter.
    fn clean(&self, line: &str) -> String {
        let s = line.trim();
        let s = self.bullet_re.replace(s, "");
        let s = self.whitespace_re.replace_all(&s, " ");
        let mut chars = s.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    }
}

/// Split content into line-like units on newlines and sentence-ending
/// punctuation followed by whitespace.
fn segment(content: &str) -> Vec<String> {
    let boundary = sentence_boundary();
    let mut out = Vec::new();
    for raw in content.split(['\n', '\r']) {
        let mut rest = raw;
        while let Some(m) = boundary.find(rest) {
            // Keep the punctuation with the left-hand unit.
            let cut = m.start() + 1;
            push_trimmed(&mut out, &rest[..cut]);
            rest = &rest[m.end()..];
        }
        push_trimmed(&mut out, rest);
    }
    out
}

fn sentence_boundary() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]\s+").expect("invalid boundary regex"))
}

fn push_trimmed(out: &mut Vec<String>, piece: &str) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("invalid extractor regex")
}
