//! Timestamp prefix matching and line classification.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use super::rules::{Rule, classify_message};
use crate::event::EventType;

/// `15/3/2023, 14:22 - <message>`
static LINE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}/\d{1,2}/\d{4}),\s(\d{1,2}:\d{2})\s*-\s*(.+)$")
        .expect("line prefix pattern is valid")
});

const DATE_TIME_FORMAT: &str = "%d/%m/%Y, %H:%M";

/// A transcript line that describes a membership change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine {
    /// Minute the line was written.
    pub timestamp: NaiveDateTime,
    /// Rule that matched the message.
    pub rule: Rule,
    /// Raw subject tokens, in order of appearance.
    pub subjects: Vec<String>,
}

impl ClassifiedLine {
    /// The event type of every subject on this line.
    pub fn event_type(&self) -> EventType {
        self.rule.event_type()
    }
}

/// Splits a dated line into its date, time and message parts.
///
/// Returns `None` for continuation lines, blank lines and anything else
/// without the timestamp prefix.
pub fn split_line(line: &str) -> Option<(&str, &str, &str)> {
    let caps = LINE_PREFIX.captures(line)?;
    Some((
        caps.get(1)?.as_str(),
        caps.get(2)?.as_str(),
        caps.get(3)?.as_str(),
    ))
}

/// Parses the day/month/year and 24-hour time captured from a line.
pub fn parse_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&format!("{date}, {time}"), DATE_TIME_FORMAT).ok()
}

/// Classifies one transcript line.
///
/// ```
/// use memberlog::parsing::classify_line;
/// use memberlog::EventType;
///
/// let line = classify_line("15/3/2023, 14:22 - +52 55 1234 5678 se unió con el enlace del grupo")
///     .unwrap();
/// assert_eq!(line.event_type(), EventType::Joined);
/// assert_eq!(line.timestamp.to_string(), "2023-03-15 14:22:00");
///
/// assert!(classify_line("solo texto de un mensaje anterior").is_none());
/// ```
pub fn classify_line(line: &str) -> Option<ClassifiedLine> {
    let (date, time, message) = split_line(line)?;
    let Some(timestamp) = parse_timestamp(date, time) else {
        tracing::debug!(date, time, "skipping line with unparseable timestamp");
        return None;
    };
    let (rule, subjects) = classify_message(message)?;
    Some(ClassifiedLine {
        timestamp,
        rule,
        subjects,
    })
}
