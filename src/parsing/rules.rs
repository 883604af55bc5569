//! Membership message rules for Spanish WhatsApp exports.
//!
//! Each [`Rule`] pairs a system-message phrasing with the [`EventType`] it
//! produces. Rules are tried in [`Rule::ORDER`]; the first match wins.
//!
//! Supported phrasings (the part after `<date>, <time> - `):
//! - `+52 55 1234 5678 se unió con el enlace del grupo`
//! - `~ Ana salió del grupo`
//! - `Se añadió a ~ Currio.`
//! - `+1 234 añadió a +1 111, ~ Bob y +1 222`

use std::sync::LazyLock;

use regex::Regex;

use super::subjects::split_subjects;
use crate::event::EventType;

/// A subject: a phone number (`+` then digits and spaces) or an alias
/// (`~`, optionally a space, then free text). Both are lazy so the rule's
/// anchor decides where the subject ends.
const SUBJECT: &str = r"(?:\+[\d\s]+?|~\s?.+?)";

/// Optional directionality mark at the start of a message.
const DIRECTION_MARK: &str = r"[\x{200E}\x{200F}]?";

/// A membership rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// `<subject> se unió con el enlace del grupo`
    JoinedViaLink,
    /// `<subject> salió del grupo`
    LeftGroup,
    /// `Se añadió a <subject>.`
    AddedByAdmin,
    /// `<actor> añadió a <subjects>`; the actor is not recorded.
    AddedByMember,
}

static RULE_REGEXES: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    Rule::ORDER.map(|rule| Regex::new(&rule.pattern()).expect("membership rule pattern is valid"))
});

impl Rule {
    /// Scanning order.
    pub const ORDER: [Rule; 4] = [
        Rule::JoinedViaLink,
        Rule::LeftGroup,
        Rule::AddedByAdmin,
        Rule::AddedByMember,
    ];

    /// The event type this rule emits.
    pub fn event_type(self) -> EventType {
        match self {
            Rule::JoinedViaLink => EventType::Joined,
            Rule::LeftGroup => EventType::Left,
            Rule::AddedByAdmin | Rule::AddedByMember => EventType::Added,
        }
    }

    fn pattern(self) -> String {
        match self {
            Rule::JoinedViaLink => {
                format!(r"^{DIRECTION_MARK}({SUBJECT})\s+se unió con el enlace del grupo")
            }
            Rule::LeftGroup => format!(r"^{DIRECTION_MARK}({SUBJECT})\s+salió del grupo"),
            Rule::AddedByAdmin => {
                format!(r"^{DIRECTION_MARK}Se añadió a ({SUBJECT})\s*\.?\s*$")
            }
            Rule::AddedByMember => format!(r"^{DIRECTION_MARK}({SUBJECT})\s+añadió a (.+)"),
        }
    }

    fn regex(self) -> &'static Regex {
        let index = match self {
            Rule::JoinedViaLink => 0,
            Rule::LeftGroup => 1,
            Rule::AddedByAdmin => 2,
            Rule::AddedByMember => 3,
        };
        &RULE_REGEXES[index]
    }

    /// Returns the raw subject tokens if `message` matches this rule.
    ///
    /// Tokens are returned as written; normalization happens in
    /// [`identify`](crate::identity::identify).
    pub fn extract(self, message: &str) -> Option<Vec<String>> {
        let caps = self.regex().captures(message)?;
        match self {
            Rule::AddedByMember => {
                let subjects = split_subjects(caps.get(2)?.as_str());
                Some(subjects)
            }
            _ => Some(vec![caps.get(1)?.as_str().to_string()]),
        }
    }
}

/// Classifies a message body, returning the matching rule and its subjects.
///
/// ```
/// use memberlog::parsing::{Rule, classify_message};
///
/// let (rule, subjects) = classify_message("~ Ana salió del grupo").unwrap();
/// assert_eq!(rule, Rule::LeftGroup);
/// assert_eq!(subjects, vec!["~ Ana".to_string()]);
///
/// assert!(classify_message("hola a todos").is_none());
/// ```
pub fn classify_message(message: &str) -> Option<(Rule, Vec<String>)> {
    Rule::ORDER
        .iter()
        .find_map(|&rule| rule.extract(message).map(|subjects| (rule, subjects)))
}
