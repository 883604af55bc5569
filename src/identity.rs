//! Subject identifier normalization and anonymization.
//!
//! WhatsApp renders phone numbers with grouping spaces (`+52 55 1234 5678`)
//! and aliases with a narrow no-break space after the sigil
//! (`~\u{202f}Currio`), sometimes behind a left-to-right mark. Normalizing
//! removes all of that so the same person always yields the same string.
//!
//! The anonymized form is the first 16 hex characters of the SHA-256 of the
//! normalized identifier. That is a stable pseudonym, not a secret: the
//! space of plausible phone numbers is small enough to enumerate. Stored
//! data depends on the exact digest length, so it must not change.

use sha2::{Digest, Sha256};

/// Number of hex characters kept from the digest.
pub const DIGEST_PREFIX_LEN: usize = 16;

const LEFT_TO_RIGHT_MARK: char = '\u{200e}';
const RIGHT_TO_LEFT_MARK: char = '\u{200f}';

/// Returns `true` for the directionality marks WhatsApp prefixes to names.
pub(crate) fn is_direction_mark(c: char) -> bool {
    c == LEFT_TO_RIGHT_MARK || c == RIGHT_TO_LEFT_MARK
}

/// Strips whitespace (including U+202F) and directionality marks.
///
/// ```
/// use memberlog::identity::normalize_identifier;
///
/// assert_eq!(normalize_identifier("+52 55 1234 5678"), "+525512345678");
/// assert_eq!(normalize_identifier("\u{200e}~\u{202f}Currio"), "~Currio");
/// ```
pub fn normalize_identifier(raw: &str) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    compact.trim_matches(is_direction_mark).to_string()
}

/// Returns the truncated SHA-256 pseudonym of an already normalized id.
fn digest(normalized: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    let mut encoded = hex::encode(hasher.finalize());
    encoded.truncate(DIGEST_PREFIX_LEN);
    encoded
}

/// Turns a raw identifier into the subject id stored on an event.
///
/// With `anonymize` the result is a 16-character hex pseudonym, otherwise
/// the normalized identifier itself.
///
/// ```
/// use memberlog::identity::identify;
///
/// let hashed = identify("+52 55 1234 5678", true);
/// assert_eq!(hashed.len(), 16);
/// assert_eq!(hashed, identify("+525512345678", true));
/// assert_eq!(identify("+52 55 1234 5678", false), "+525512345678");
/// ```
pub fn identify(raw: &str, anonymize: bool) -> String {
    let normalized = normalize_identifier(raw);
    if anonymize {
        digest(&normalized)
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_all_whitespace_kinds() {
        assert_eq!(normalize_identifier(" +1 234\t567 "), "+1234567");
        assert_eq!(normalize_identifier("~\u{202f}Bob"), "~Bob");
        assert_eq!(normalize_identifier("~\u{a0}Bob"), "~Bob");
    }

    #[test]
    fn test_normalize_strips_direction_marks() {
        assert_eq!(normalize_identifier("\u{200e}+1 111"), "+1111");
        assert_eq!(normalize_identifier("\u{200f}~ Ana"), "~Ana");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_identifier("\u{200e}+52 55 1234 5678");
        assert_eq!(normalize_identifier(&once), once);
    }

    #[test]
    fn test_known_digest() {
        // sha256("abc") = ba7816bf8f01cfea414140de5dae2223...
        assert_eq!(identify("abc", true), "ba7816bf8f01cfea");
    }

    #[test]
    fn test_hash_is_lowercase_hex() {
        let hashed = identify("~ Currio", true);
        assert_eq!(hashed.len(), DIGEST_PREFIX_LEN);
        assert!(hashed.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_distinct_inputs_distinct_hashes() {
        assert_ne!(identify("+1 111", true), identify("+1 222", true));
    }

    #[test]
    fn test_hash_applies_after_normalization() {
        assert_eq!(identify("+1 111", true), identify("\u{200e}+1111", true));
    }
}
