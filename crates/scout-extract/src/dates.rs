//! Due-date inference.
//!
//! A line mentions a deadline through a "by/due/before/no later than"
//! phrase; the phrase is then resolved against an injected `today` so
//! callers (and tests) control the clock. Resolution tries a fixed
//! sequence of patterns and the first success wins.

use std::sync::OnceLock;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use regex::Regex;

struct DatePatterns {
    due_phrase: Regex,
    relative_day: Regex,
    end_of_week: Regex,
    end_of_month: Regex,
    weekday: Regex,
    month_day: Regex,
    iso: Regex,
    slash: Regex,
}

fn patterns() -> &'static DatePatterns {
    static PATTERNS: OnceLock<DatePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| DatePatterns {
        due_phrase: compile(r"(?i)\b(?:by|due|before|no\s+later\s+than)\s+[\w/\-,\s]{2,35}"),
        relative_day: compile(r"(?i)\b(?:eod|cob|end\s+of\s+(?:the\s+)?day)\b"),
        end_of_week: compile(r"(?i)\bend\s+of\s+(?:the\s+)?week\b"),
        end_of_month: compile(r"(?i)\bend\s+of\s+(?:the\s+)?month\b"),
        weekday: compile(
            r"(?i)\b(?:by|on|due)\s+(?:next\s+)?(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
        ),
        month_day: compile(
            r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sep|oct|nov|dec)\s+(\d{1,2})(?:st|nd|rd|th)?\s*(?:,?\s*(\d{4}))?\b",
        ),
        iso: compile(r"\b(\d{4})-(\d{2})-(\d{2})\b"),
        slash: compile(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{2,4}))?\b"),
    })
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("invalid date regex")
}

/// Find a due phrase in `text` and resolve it to a calendar date.
///
/// Returns `None` when no due phrase is present or the phrase does not
/// resolve to a valid date.
pub fn resolve_due_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let phrase = patterns().due_phrase.find(text)?;
    parse_date_expr(phrase.as_str(), today)
}

/// Resolve a date expression. First matching pattern wins:
/// relative-day keywords, end of week, end of month, weekday names,
/// month-name + day, ISO, then slash-separated.
pub fn parse_date_expr(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let p = patterns();

    // EOD / COB collapse to the current date.
    if p.relative_day.is_match(text) {
        return Some(today);
    }

    // "End of week" means the upcoming Friday -- next week's if today
    // already is Friday.
    if p.end_of_week.is_match(text) {
        return Some(next_weekday_after(today, Weekday::Fri));
    }

    // Last calendar day of the current month.
    if p.end_of_month.is_match(text) {
        return last_day_of_month(today);
    }

    // "by/on/due [next] <weekday>" -- next occurrence strictly after
    // today, wrapping a full week when today matches.
    if let Some(caps) = p.weekday.captures(text) {
        let target = weekday_from_name(&caps[1])?;
        return Some(next_weekday_after(today, target));
    }

    // "March 5th", "Mar 5, 2027".
    if let Some(caps) = p.month_day.captures(text) {
        let month = month_from_name(&caps[1])?;
        let day: u32 = caps[2].parse().ok()?;
        let year: i32 = match caps.get(3) {
            Some(y) => y.as_str().parse().ok()?,
            None => today.year(),
        };
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            if date < today {
                // Already past -- roll to the year after the current one.
                return NaiveDate::from_ymd_opt(today.year() + 1, month, day);
            }
            return Some(date);
        }
    }

    // ISO YYYY-MM-DD.
    if let Some(caps) = p.iso.captures(text) {
        let (y, m, d) = (
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        );
        if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
            return Some(date);
        }
    }

    // MM/DD or MM/DD/YYYY, two-digit years assumed 2000+.
    if let Some(caps) = p.slash.captures(text) {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        let year: i32 = match caps.get(3) {
            Some(y) => {
                let y: i32 = y.as_str().parse().ok()?;
                if y < 100 {
                    y + 2000
                } else {
                    y
                }
            }
            None => today.year(),
        };
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            // A year-less slash date that has already passed means the
            // next occurrence.
            if caps.get(3).is_none() && date < today {
                return NaiveDate::from_ymd_opt(year + 1, month, day);
            }
            return Some(date);
        }
    }

    None
}

/// Next occurrence of `target` strictly after `today`.
fn next_weekday_after(today: NaiveDate, target: Weekday) -> NaiveDate {
    let today_num = today.weekday().num_days_from_monday();
    let target_num = target.num_days_from_monday();
    let mut diff = (target_num + 7 - today_num) % 7;
    if diff == 0 {
        diff = 7;
    }
    today + Days::new(u64::from(diff))
}

fn last_day_of_month(today: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name.to_ascii_lowercase().as_str() {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

fn month_from_name(name: &str) -> Option<u32> {
    match name.to_ascii_lowercase().as_str() {
        "january" | "jan" => Some(1),
        "february" | "feb" => Some(2),
        "march" | "mar" => Some(3),
        "april" | "apr" => Some(4),
        "may" => Some(5),
        "june" | "jun" => Some(6),
        "july" | "jul" => Some(7),
        "august" | "aug" => Some(8),
        "september" | "sep" => Some(9),
        "october" | "oct" => Some(10),
        "november" | "nov" => Some(11),
        "december" | "dec" => Some(12),
        _ => None,
    }
}
