//! Splitting the subject list of an "añadió a" message.

use std::sync::LazyLock;

use regex::Regex;

use crate::identity::is_direction_mark;

static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+y\s+|,\s*").expect("separator pattern is valid"));

static EMBEDDED_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+[\d\s]+").expect("phone pattern is valid"));

/// Splits `+1 111, ~ Bob y +1 222.` into its subjects.
///
/// Segments are separated by `, ` or ` y `. A segment that contains a phone
/// number keeps only the number, since some exports put a display name next
/// to it. Order is preserved and repeats are kept.
///
/// ```
/// use memberlog::parsing::split_subjects;
///
/// assert_eq!(
///     split_subjects("+1 111, ~Bob y +1 222."),
///     vec!["+1 111", "~Bob", "+1 222"],
/// );
/// ```
pub fn split_subjects(text: &str) -> Vec<String> {
    let text = text.strip_suffix('.').unwrap_or(text);

    SEPARATOR
        .split(text)
        .filter_map(|segment| {
            let segment = segment.trim().trim_start_matches(is_direction_mark).trim();
            if let Some(phone) = EMBEDDED_PHONE.find(segment) {
                return Some(phone.as_str().trim().to_string());
            }
            (!segment.is_empty()).then(|| segment.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_subject() {
        assert_eq!(split_subjects("+52 1 55 0000 0000"), vec!["+52 1 55 0000 0000"]);
    }

    #[test]
    fn test_mixed_delimiters() {
        assert_eq!(
            split_subjects("~ Ana, +1 111 y ~ Luis"),
            vec!["~ Ana", "+1 111", "~ Luis"]
        );
    }

    #[test]
    fn test_strips_single_trailing_period() {
        assert_eq!(split_subjects("~Currio."), vec!["~Currio"]);
    }

    #[test]
    fn test_phone_wins_over_display_name() {
        assert_eq!(split_subjects("Tía Rosa +52 55 9999 0000"), vec!["+52 55 9999 0000"]);
    }

    #[test]
    fn test_direction_marks_removed() {
        assert_eq!(
            split_subjects("\u{200e}~ Bob y \u{200e}+1 222"),
            vec!["~ Bob", "+1 222"]
        );
    }

    #[test]
    fn test_keeps_repeats_and_drops_empty_segments() {
        assert_eq!(split_subjects("+1 111, , +1 111"), vec!["+1 111", "+1 111"]);
    }

    #[test]
    fn test_word_containing_y_is_not_a_separator() {
        assert_eq!(split_subjects("~ Yoyo y ~ Maya"), vec!["~ Yoyo", "~ Maya"]);
    }
}
