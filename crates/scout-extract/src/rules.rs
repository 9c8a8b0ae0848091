//! Hard-skip rules for candidate lines.
//!
//! An ordered list of named predicates evaluated top to bottom; the
//! first matching rule discards the line outright, and later rules are
//! never consulted. Rule order is a documented contract, not incidental
//! code order -- tests target each rule by name.

use regex::Regex;

/// A single named skip predicate.
pub struct SkipRule {
    name: &'static str,
    applies: Box<dyn Fn(&str) -> bool + Send + Sync>,
}

impl SkipRule {
    fn regex(name: &'static str, pattern: &str) -> Self {
        let re = compile(pattern);
        Self {
            name,
            applies: Box::new(move |line| re.is_match(line)),
        }
    }

    fn with(name: &'static str, applies: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self {
            name,
            applies: Box::new(applies),
        }
    }
}

/// The full cascade, compiled once and reused across extraction calls.
pub struct SkipRules {
    rules: Vec<SkipRule>,
}

impl Default for SkipRules {
    fn default() -> Self {
        Self::new()
    }
}

impl SkipRules {
    pub fn new() -> Self {
        let mut rules = Vec::new();

        // Inline image references from mail clients.
        rules.push(SkipRule::regex("image-placeholder", r"(?i)^\[image:"));

        // Salutation openers: "Hi Dana,", "Good morning team,".
        let salutation = compile(
            r"(?i)^(?:hi|hello|hey|dear|g'?day|good\s+(?:morning|afternoon|evening|day))\b",
        );
        rules.push(SkipRule::with("salutation", move |line| {
            salutation.is_match(line) && word_count(line) <= 20
        }));

        // Document bylines: "By Dana Whitfield". The name part stays
        // case-sensitive so "by the way" does not qualify.
        rules.push(SkipRule::regex(
            "byline",
            r"^(?i:by)\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\s*$",
        ));

        // Ownership / role label lines: "Owner: Dana, Drew".
        rules.push(SkipRule::regex(
            "role-label",
            r"(?i)^(?:owner|lead|responsible|assignee|poc|dri|point\s+of\s+contact)\s*:",
        ));

        // Reply-thread attribution headers, including wrapped ones that
        // end with a bare "<" or the sender address.
        let attrib_start = compile(r"(?i)^on\s+\w");
        let attrib_end = compile(r"(?i)(?:wrote:\s*$|<\s*$|@[\w.\-]+>\s*$)");
        rules.push(SkipRule::with("thread-attribution", move |line| {
            attrib_start.is_match(line) && attrib_end.is_match(line)
        }));

        // Quoted-reply attribution fragments: "a@x.com> wrote:".
        rules.push(SkipRule::regex(
            "quoted-attribution",
            r"(?i)@[\w.\-]+>\s*wrote:\s*$",
        ));

        // Corporate footer / legal boilerplate.
        rules.push(SkipRule::regex(
            "footer-boilerplate",
            r"(?i)^(?:you\s+have\s+received\s+this\s+email\s+because|this\s+email\s+was\s+sent\s+to|unsubscribe|privacy\s+policy|©\s*\d{4}|all\s+rights\s+reserved|\d+\s+\w+.*(?:ave|blvd|pkwy|way|street|road|drive).*\busa\b)",
        ));

        // Document-share notifications inside reply bodies.
        let shared_doc = compile(
            r"(?i)^[\w\s.\-]+ shared (?:a |an )?(?:document|file|folder|spreadsheet|slide)",
        );
        let invite = compile(r"(?i)^[\w\s.\-]+\([\w.\-+]+@[\w.\-]+\)\s+has\s+(?:invited|shared)");
        rules.push(SkipRule::with("share-notification", move |line| {
            shared_doc.is_match(line) || invite.is_match(line)
        }));

        // Bare contact lines: "Name <email>" / "Name (email)" standing
        // alone, or a standalone address.
        let name_with_addr = compile(
            r"(?i)^[\w\s.\-]+[(<][\w.\-+]+@[\w.\-]+\.(?:com|net|org|io)[>)]\s*(?:has\s+invited|shared|wrote|said)?",
        );
        let bare_addr = compile(r"^[\w.\-+]+@[\w.\-]+");
        rules.push(SkipRule::with("contact-line", move |line| {
            (name_with_addr.is_match(line) && word_count(line) <= 15)
                || (bare_addr.is_match(line) && word_count(line) <= 4)
        }));

        // Raw header lines inside quoted/forwarded blocks, with optional
        // quote-marker prefix: "> From:", "Subject:", "X-Mailer:".
        rules.push(SkipRule::regex(
            "header-line",
            r"(?i)^[>\s]*(?:from|to|cc|bcc|subject|date|reply-to|message-id|delivered-to|received|x-[\w\-]+)\s*:",
        ));

        // Calendar event field labels: "Organizer:", "When:", "Join Zoom".
        rules.push(SkipRule::regex(
            "calendar-field",
            r"(?i)^[>\s]*(?:organizer|when|where|attendees?|time|location|event(?:\s+title)?|join\s+(?:zoom|the\s+meeting)|dial[\s\-]?in|conference\s+(?:id|room)|proposed\s+(?:new\s+)?time|video\s+call|meeting\s+link)\s*[:\-]",
        ));

        // Standalone domain / URL lines: "www.corgi.dev".
        rules.push(SkipRule::regex(
            "bare-domain",
            r"(?i)^(?:www\.)?[\w\-]+\.(?:com|net|org|io|ai|co|us)\s*$",
        ));

        // Signature contact info: a phone number paired with an address.
        let phone = compile(r"\+?\d[\d\s.\-()]{6,}\d");
        let any_addr = compile(r"@[\w.\-]+");
        rules.push(SkipRule::with("signature-contact", move |line| {
            phone.is_match(line) && any_addr.is_match(line)
        }));

        // Time-slot-only lines: "8:30am (CDT)".
        rules.push(SkipRule::regex(
            "time-slot",
            r"(?i)^\d{1,2}:\d{2}\s*(?:am|pm)\b",
        ));

        // Day-of-week date/time lines: "Tue Apr 28, 2026 9am – 9:30am".
        let weekday_start = compile(r"(?i)^(?:mon|tue|wed|thu|fri|sat|sun)\w*\b");
        let clock = compile(r"(?i)\b\d{1,2}(?::\d{2})?\s*(?:am|pm)\b");
        rules.push(SkipRule::with("weekday-time", move |line| {
            weekday_start.is_match(line) && clock.is_match(line) && word_count(line) <= 12
        }));

        // Standalone person-name lines: a bare name with no action
        // vocabulary is never an action item.
        let bare_name = compile(r"^[A-Z][a-z]+(?:\s+[A-Z][a-z]+)+\s*(?:[-–]\s*[\w\s]+)?$");
        let action_vocab =
            compile(r"(?i)\b(?:please|must|should|need|action|follow|next\s+step)\b");
        rules.push(SkipRule::with("bare-name", move |line| {
            bare_name.is_match(line) && word_count(line) <= 6 && !action_vocab.is_match(line)
        }));

        // Lines ending with ":" are section headers / list introducers.
        rules.push(SkipRule::with("section-header", |line| {
            line.trim_end().ends_with(':')
        }));

        // Line-wrapped sentence fragments -- they end with a word that
        // almost never closes a complete sentence: prepositions,
        // conjunctions, articles, determiners, pronouns.
        let dangling = compile(
            r"(?i)\b(?:to|and|or|but|for|in|of|at|by|from|with|into|onto|over|through|about|the|a|an|this|that|these|those|your|our|their|its|my|his|her|me|us|them|him)\s*$",
        );
        rules.push(SkipRule::with("wrapped-fragment", move |line| {
            dangling.is_match(line) && word_count(line) >= 5
        }));

        // Two or more addresses on one line -- To:/Cc: continuations
        // from forwarded mail.
        let addr = compile(r"[\w.\-+]+@[\w.\-]+");
        rules.push(SkipRule::with("multi-address", move |line| {
            addr.find_iter(line).count() >= 2
        }));

        Self { rules }
    }

    /// The name of the first rule that discards this line, if any.
    pub fn first_match(&self, line: &str) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|rule| (rule.applies)(line))
            .map(|rule| rule.name)
    }

    /// Rule names in evaluation order.
    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }
}

pub(crate) fn word_count(line: &str) -> usize {
    line.split_whitespace().count()
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("invalid skip-rule regex")
}
