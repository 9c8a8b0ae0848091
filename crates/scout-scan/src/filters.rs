//! Channel-specific non-actionable content filters.
//!
//! Mail and chat channels carry structured noise the extractor should
//! never see: calendar traffic, automated senders, quoted reply
//! history. These filters classify whole messages before any line-level
//! heuristics run.

use std::sync::OnceLock;

use regex::Regex;

/// Subject prefixes of calendar invitations, responses, reschedules,
/// and document-share notifications.
const CALENDAR_SUBJECT_PREFIXES: &[&str] = &[
    "accepted:",
    "declined:",
    "tentative:",
    "canceled:",
    "cancellation:",
    "canceled event:",
    "cancelled event:",
    "cancellation notice:",
    "tentatively accepted:",
    "tentatively declined:",
    "updated invitation",
    "invitation:",
    "forwarded invitation:",
    "new event:",
    "proposed new time:",
    "new time proposed:",
    "re: proposed new time:",
    "document shared with you:",
    "re: document shared with you:",
    "fwd: document shared with you:",
    "shared a file with you:",
    "re: shared a file with you:",
    "has shared",
    "shared with you:",
];

/// Sender substrings of automated / no-reply mail.
const AUTOMATED_SENDER_MARKERS: &[&str] = &[
    "calendar-notification@",
    "no-reply@",
    "noreply@",
    "donotreply@",
    "notifications@",
    "drive-shares-dm-noreply@",
    "mailer-daemon@",
];

/// Subject keywords of internal broadcast mail -- too contextual for the
/// deterministic extractor, routed to the ingest queue instead.
const BROADCAST_SUBJECT_KEYWORDS: &[&str] = &[
    "summary",
    "alignment",
    "recap",
    "readout",
    "highlights",
    "debrief",
    "status update",
];

fn reschedule_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)proposed\s+new\s+time|new\s+time\s+proposed|rescheduled?\b")
            .expect("invalid reschedule regex")
    })
}

fn calendar_body_patterns() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?i)\bOrganizer\s*:",
            r"(?i)\bWhen\s*:\s+\S",
            r"(?i)\bWhere\s*:\s+\S",
            r"(?i)\bJoin\s+(?:Zoom|Google\s+Meet|the\s+meeting|Teams)\b",
            r"(?i)(?:zoom\.us/j/|meet\.google\.com/|teams\.microsoft\.com)",
            r"(?i)\bVideo\s+call\s+link\b",
            r"(?i)\bProposed\s+new\s+time\b",
            r"(?i)\bConference\s+(?:ID|room|call)\b",
            r"(?i)\bDial-?in\b.*\bnumber\b",
            r"(?i)\bGuests\s+can\b",
            r"(?i)\bGoing\?\s+(?:Yes|No|Maybe)\b",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("invalid calendar-body regex"))
        .collect()
    })
}

/// Calendar invitation / response / reschedule, judged by subject.
pub fn is_calendar_subject(subject: &str) -> bool {
    let s = subject.trim().to_lowercase();
    if CALENDAR_SUBJECT_PREFIXES.iter().any(|p| s.starts_with(p)) {
        return true;
    }
    // Reply chains bury the prefix behind "Re:" -- match the phrases
    // anywhere in the subject.
    reschedule_re().is_match(&s)
}

/// Calendar/meeting notification body, even from a human sender.
/// Requires at least two independent signals; one alone is not enough.
pub fn is_calendar_body(body: &str) -> bool {
    let hits = calendar_body_patterns()
        .iter()
        .filter(|re| re.is_match(body))
        .count();
    hits >= 2
}

/// Automated or no-reply sender.
pub fn is_automated_sender(sender: &str) -> bool {
    let s = sender.to_lowercase();
    AUTOMATED_SENDER_MARKERS.iter().any(|m| s.contains(m))
}

/// Mail the tracked person sent to themselves (app digests included).
pub fn is_self_sender(sender: &str, self_email: &str) -> bool {
    !self_email.is_empty() && sender.to_lowercase().contains(&self_email.to_lowercase())
}

/// Broadcast / summary mail, judged by subject keyword.
pub fn is_broadcast_subject(subject: &str) -> bool {
    let s = subject.to_lowercase();
    BROADCAST_SUBJECT_KEYWORDS.iter().any(|k| s.contains(k))
}

/// Domain of the sender address, lowercased.
pub fn sender_domain(sender: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"@([\w.\-]+)").expect("invalid domain regex"));
    re.captures(sender).map(|c| c[1].to_lowercase())
}

/// Whether the sender belongs to the trusted internal domain.
pub fn is_internal_sender(sender: &str, internal_domain: &str) -> bool {
    if internal_domain.is_empty() {
        return false;
    }
    sender_domain(sender)
        .map(|d| d.contains(&internal_domain.to_lowercase()))
        .unwrap_or(false)
}

/// Display name portion of a sender, falling back to the full value.
pub fn display_name(sender: &str) -> &str {
    let name = sender.split('<').next().unwrap_or(sender).trim();
    if name.is_empty() {
        sender.trim()
    } else {
        name
    }
}

/// Strip quoted reply/forward history from a mail body.
///
/// Everything from the first reply attribution onwards is content from
/// a previous message, not a new directive. Handles the one-line and
/// wrapped attribution forms, any depth of `>`-quoted lines (plus the
/// blank line immediately after a quote run), and a 3+ dash/underscore
/// signature separator.
pub fn strip_quoted_history(body: &str) -> String {
    static ATTRIBUTION: OnceLock<Regex> = OnceLock::new();
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();

    let attribution = ATTRIBUTION.get_or_init(|| {
        Regex::new(r"(?im)^On\s+\w[^\n]{5,200}(?:\n[^\n]{0,100})?wrote:\s*$")
            .expect("invalid attribution regex")
    });
    let separator = SEPARATOR
        .get_or_init(|| Regex::new(r"\n[-_]{3,}\s*\n").expect("invalid separator regex"));

    let mut body = match attribution.find(body) {
        Some(m) => &body[..m.start()],
        None => body,
    }
    .to_string();

    // Drop quoted lines and the blank line that trails a quote run.
    let mut kept = Vec::new();
    let mut prev_was_quote = false;
    for line in body.split('\n') {
        if line.trim_start().starts_with('>') {
            prev_was_quote = true;
            continue;
        }
        if prev_was_quote && line.trim().is_empty() {
            continue;
        }
        prev_was_quote = false;
        kept.push(line);
    }
    body = kept.join("\n");

    if let Some(m) = separator.find(&body) {
        body.truncate(m.start());
    }

    body.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Calendar subject
    // =========================================================================

    #[test]
    fn test_invite_subjects_are_calendar() {
        assert!(is_calendar_subject("Invitation: Q3 planning @ Tue 9am"));
        assert!(is_calendar_subject("Accepted: Weekly sync"));
        assert!(is_calendar_subject("Declined: Budget review"));
        assert!(is_calendar_subject("Updated invitation with note: standup"));
        assert!(is_calendar_subject("New event: All hands"));
    }

    #[test]
    fn test_reschedule_phrases_match_anywhere() {
        assert!(is_calendar_subject("Re: Proposed new time: design review"));
        assert!(is_calendar_subject("Fwd: meeting rescheduled to Thursday"));
    }

    #[test]
    fn test_normal_subjects_are_not_calendar() {
        assert!(!is_calendar_subject("Q3 pricing follow-up"));
        assert!(!is_calendar_subject("Re: vendor shortlist"));
    }

    // =========================================================================
    // Calendar body
    // =========================================================================

    #[test]
    fn test_two_signals_classify_calendar_body() {
        let body = "Organizer: Jordan Lee\nWhen: Tuesday 9am - 10am";
        assert!(is_calendar_body(body));
        let body = "Join Zoom meeting today\nGoing? Yes - No - Maybe";
        assert!(is_calendar_body(body));
    }

    #[test]
    fn test_one_signal_is_not_calendar_body() {
        assert!(!is_calendar_body("Organizer: Jordan Lee\nsaid we should sync"));
        assert!(!is_calendar_body("Can you join the meeting notes doc?"));
    }

    #[test]
    fn test_plain_body_is_not_calendar() {
        assert!(!is_calendar_body(
            "Quick update on pricing -- numbers attached. Can you review?"
        ));
    }

    // =========================================================================
    // Senders
    // =========================================================================

    #[test]
    fn test_automated_senders() {
        assert!(is_automated_sender("no-reply@service.example.com"));
        assert!(is_automated_sender("Calendar <calendar-notification@mail.example.com>"));
        assert!(is_automated_sender("notifications@tracker.example.com"));
        assert!(!is_automated_sender("Jordan Lee <jordan@corgihq.com>"));
    }

    #[test]
    fn test_self_sender() {
        assert!(is_self_sender(
            "Morgan Reyes <morgan@corgi.dev>",
            "morgan@corgi.dev"
        ));
        assert!(!is_self_sender("Jordan <jordan@corgi.dev>", "morgan@corgi.dev"));
        assert!(!is_self_sender("Jordan <jordan@corgi.dev>", ""));
    }

    #[test]
    fn test_internal_sender() {
        assert!(is_internal_sender("Jordan <jordan@corgi.dev>", "corgi.dev"));
        assert!(!is_internal_sender("Sales <hi@outbound.example.com>", "corgi.dev"));
        assert!(!is_internal_sender("Jordan <jordan@corgi.dev>", ""));
        assert!(!is_internal_sender("no address here", "corgi.dev"));
    }

    #[test]
    fn test_broadcast_subject() {
        assert!(is_broadcast_subject("Weekly summary: platform team"));
        assert!(is_broadcast_subject("Q3 alignment readout"));
        assert!(is_broadcast_subject("Sprint recap"));
        assert!(!is_broadcast_subject("Can you review the proposal?"));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("Jordan Lee <jordan@corgihq.com>"), "Jordan Lee");
        assert_eq!(display_name("jordan@corgihq.com"), "jordan@corgihq.com");
        assert_eq!(display_name("<jordan@corgihq.com>"), "<jordan@corgihq.com>");
    }

    // =========================================================================
    // Quote stripping
    // =========================================================================

    #[test]
    fn test_strip_cuts_at_attribution() {
        let body = "New paragraph.\n\nOn Tue, Jan 2 at 3:00 PM A <a@x.com> wrote:\n> old content";
        assert_eq!(strip_quoted_history(body), "New paragraph.");
    }

    #[test]
    fn test_strip_handles_wrapped_attribution() {
        let body = "Will do.\n\nOn Mon, Feb 2 at 9:15 AM Jordan Lee <\njordan@corgihq.com> wrote:\n> earlier ask";
        assert_eq!(strip_quoted_history(body), "Will do.");
    }

    #[test]
    fn test_strip_drops_quote_runs_and_trailing_blank() {
        let body = "Top reply\n> quoted one\n>> quoted two\n\nAfter the quotes";
        assert_eq!(strip_quoted_history(body), "Top reply\nAfter the quotes");
    }

    #[test]
    fn test_strip_truncates_at_signature_separator() {
        let body = "The actual message\n---\nMorgan Reyes\nmorgan@corgi.dev";
        assert_eq!(strip_quoted_history(body), "The actual message");
        let body = "The actual message\n____\nsig";
        assert_eq!(strip_quoted_history(body), "The actual message");
    }

    #[test]
    fn test_strip_leaves_clean_body_alone() {
        let body = "Just one paragraph with nothing quoted.";
        assert_eq!(strip_quoted_history(body), body);
    }

    #[test]
    fn test_strip_keeps_short_dashes() {
        // A two-dash line is not a signature separator.
        let body = "Above\n--\nBelow";
        assert_eq!(strip_quoted_history(body), "Above\n--\nBelow");
    }
}
