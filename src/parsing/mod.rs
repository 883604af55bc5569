//! Line-level parsing of WhatsApp transcripts.
//!
//! A transcript line either starts with a `d/m/yyyy, h:mm - ` prefix or is
//! a continuation of a previous message. Only prefixed lines whose message
//! matches one of the membership [`Rule`]s produce events; everything else
//! is ignored.

pub mod line;
pub mod rules;
pub mod subjects;

pub use line::{ClassifiedLine, classify_line, parse_timestamp, split_line};
pub use rules::{Rule, classify_message};
pub use subjects::split_subjects;
