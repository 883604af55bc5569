//! Membership events extracted from group transcripts.
//!
//! An [`Event`] records that a subject joined, left, or was added to a group
//! at a given minute. Events are plain values: the parser produces them, the
//! orchestrator aggregates them, and a sink persists them.
//!
//! # Natural key
//!
//! The `(timestamp, group_name, subject_id, event_type)` tuple identifies an
//! event. The parser may emit the same tuple twice (two identical adds in the
//! same minute); sinks collapse those on load.
//!
//! ```
//! use memberlog::{Event, EventType};
//! use chrono::NaiveDate;
//!
//! let ts = NaiveDate::from_ymd_opt(2023, 3, 15)
//!     .unwrap()
//!     .and_hms_opt(14, 22, 0)
//!     .unwrap();
//! let a = Event::new(ts, "Los Amigos", "+525512345678", EventType::Joined);
//! let b = a.clone();
//! assert_eq!(a.key(), b.key());
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::MemberlogError;

/// Canonical string form of an event timestamp in persisted rows.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The kind of membership change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// Joined through the group's invite link.
    Joined,
    /// Left the group.
    Left,
    /// Added by an admin or another member.
    Added,
}

impl EventType {
    /// Returns the persisted name of this event type.
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Joined => "joined",
            EventType::Left => "left",
            EventType::Added => "added",
        }
    }

    /// Returns all event types in reporting order.
    pub fn all() -> &'static [EventType] {
        &[EventType::Joined, EventType::Left, EventType::Added]
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = MemberlogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "joined" => Ok(EventType::Joined),
            "left" => Ok(EventType::Left),
            "added" => Ok(EventType::Added),
            _ => Err(MemberlogError::invalid_event_type(s)),
        }
    }
}

/// A single membership event.
///
/// Serializes with the column names used by persisted destinations:
/// `timestamp`, `group_name`, `user_phone_hash`, `event_type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    /// Minute at which the event happened, in the exporter's local time.
    #[serde(with = "canonical_timestamp")]
    pub timestamp: NaiveDateTime,

    /// Group the transcript belongs to.
    pub group_name: String,

    /// Hashed or normalized identifier of the affected user.
    #[serde(rename = "user_phone_hash")]
    pub subject_id: String,

    /// What happened.
    pub event_type: EventType,
}

impl Event {
    /// Creates a new event.
    pub fn new(
        timestamp: NaiveDateTime,
        group_name: impl Into<String>,
        subject_id: impl Into<String>,
        event_type: EventType,
    ) -> Self {
        Self {
            timestamp,
            group_name: group_name.into(),
            subject_id: subject_id.into(),
            event_type,
        }
    }

    /// Returns the natural key of this event.
    pub fn key(&self) -> EventKey {
        EventKey {
            timestamp: self.timestamp_string(),
            group_name: self.group_name.clone(),
            subject_id: self.subject_id.clone(),
            event_type: self.event_type,
        }
    }

    /// Returns the timestamp in its canonical persisted form.
    pub fn timestamp_string(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// The deduplication key of an [`Event`].
///
/// The timestamp is held in canonical string form so keys read back from a
/// destination compare equal to keys built from freshly parsed events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKey {
    pub timestamp: String,
    pub group_name: String,
    pub subject_id: String,
    pub event_type: EventType,
}

/// Per-type tally of a batch of events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventCounts {
    pub joined: usize,
    pub left: usize,
    pub added: usize,
}

impl EventCounts {
    /// Counts the events of each type in `events`.
    pub fn tally(events: &[Event]) -> Self {
        events.iter().fold(Self::default(), |mut counts, event| {
            match event.event_type {
                EventType::Joined => counts.joined += 1,
                EventType::Left => counts.left += 1,
                EventType::Added => counts.added += 1,
            }
            counts
        })
    }

    /// Total number of events.
    pub fn total(&self) -> usize {
        self.joined + self.left + self.added
    }

    /// Returns `true` if no events were counted.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Returns the count for one event type.
    pub fn get(&self, event_type: EventType) -> usize {
        match event_type {
            EventType::Joined => self.joined,
            EventType::Left => self.left,
            EventType::Added => self.added,
        }
    }
}

impl fmt::Display for EventCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} events: {} joined, {} left, {} added",
            self.total(),
            self.joined,
            self.left,
            self.added
        )
    }
}

mod canonical_timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_stored_timestamp(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognized timestamp '{raw}'")))
    }
}

/// Parses a timestamp as it may appear in a persisted destination.
///
/// Accepts the canonical form plus the ISO `T` separator and minute-only
/// variants that other tools write for the same column.
pub fn parse_stored_timestamp(raw: &str) -> Option<NaiveDateTime> {
    const FORMATS: &[&str] = &[
        TIMESTAMP_FORMAT,
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    let raw = raw.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}
