pub const SLUG_MIN_LENGTH: usize = 3;
pub const SLUG_FORMAT_MESSAGE: &str = "Must be lowercase letters or dashes without spaces.";

/// Check a topic slug, returning every violated rule in rule order.
///
/// Slugs are at least three characters of lowercase ASCII letters and dashes.
pub fn slug_violations(slug: &str) -> Vec<String> {
    let mut violations = Vec::new();

    if let Some(message) = min_length_violation(slug, SLUG_MIN_LENGTH) {
        violations.push(message);
    }

    let is_valid_format =
        !slug.is_empty() && slug.chars().all(|c| c.is_ascii_lowercase() || c == '-');
    if !is_valid_format {
        violations.push(SLUG_FORMAT_MESSAGE.to_string());
    }

    violations
}

pub(crate) fn min_length_violation(value: &str, min: usize) -> Option<String> {
    if value.chars().count() < min {
        Some(format!("String must contain at least {min} character(s)"))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_slugs() {
        assert!(slug_violations("rust-lang").is_empty());
        assert!(slug_violations("abc").is_empty());
        assert!(slug_violations("---").is_empty());
        assert!(slug_violations("-leading-and-trailing-").is_empty());
    }

    #[test]
    fn test_short_slug_reports_length_only() {
        assert_eq!(
            slug_violations("ab"),
            vec!["String must contain at least 3 character(s)".to_string()]
        );
    }

    #[test]
    fn test_rejects_disallowed_characters() {
        for slug in ["My Topic", "rust lang", "rust_lang", "rust2", "Rust", "topic!"] {
            assert_eq!(
                slug_violations(slug),
                vec![SLUG_FORMAT_MESSAGE.to_string()],
                "{slug} should fail the format rule"
            );
        }
    }

    #[test]
    fn test_rejects_non_ascii_letters() {
        assert_eq!(slug_violations("café"), vec![SLUG_FORMAT_MESSAGE.to_string()]);
    }

    #[test]
    fn test_short_and_malformed_reports_both_in_order() {
        assert_eq!(
            slug_violations("A"),
            vec![
                "String must contain at least 3 character(s)".to_string(),
                SLUG_FORMAT_MESSAGE.to_string(),
            ]
        );
        assert_eq!(slug_violations("").len(), 2);
    }

    #[test]
    fn test_min_length_counts_characters() {
        assert!(min_length_violation("ééé", 3).is_none());
        assert!(min_length_violation("éé", 3).is_some());
    }
}
