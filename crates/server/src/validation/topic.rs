use crate::form::{FieldErrors, FormData};

use super::slug::{min_length_violation, slug_violations};

pub const DESCRIPTION_MIN_LENGTH: usize = 10;
pub const MISSING_FIELD_MESSAGE: &str = "Expected string, received null";

/// A submission that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateTopicInput {
    pub name: String,
    pub description: String,
}

/// Validate a create-topic submission.
///
/// Every field is checked, so a submission with two bad fields reports both.
pub fn validate_create_topic<F>(form: &F) -> Result<CreateTopicInput, FieldErrors>
where
    F: FormData + ?Sized,
{
    let mut errors = FieldErrors::new();

    let name = form.get("name");
    match name {
        Some(name) => errors.extend("name", slug_violations(name)),
        None => errors.push("name", MISSING_FIELD_MESSAGE),
    }

    let description = form.get("description");
    match description {
        Some(description) => {
            if let Some(message) = min_length_violation(description, DESCRIPTION_MIN_LENGTH) {
                errors.push("description", message);
            }
        }
        None => errors.push("description", MISSING_FIELD_MESSAGE),
    }

    match (name, description) {
        (Some(name), Some(description)) if errors.is_empty() => Ok(CreateTopicInput {
            name: name.to_string(),
            description: description.to_string(),
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::slug::SLUG_FORMAT_MESSAGE;

    fn validate(fields: &[(&str, &str)]) -> Result<CreateTopicInput, FieldErrors> {
        validate_create_topic(fields)
    }

    #[test]
    fn test_valid_submission() {
        let input = validate(&[
            ("name", "rust-lang"),
            ("description", "a sufficiently long description"),
        ])
        .unwrap();

        assert_eq!(input.name, "rust-lang");
        assert_eq!(input.description, "a sufficiently long description");
    }

    #[test]
    fn test_short_name() {
        let errors = validate(&[
            ("name", "ab"),
            ("description", "short enough description text"),
        ])
        .unwrap_err();

        assert_eq!(
            errors.get("name"),
            Some(&["String must contain at least 3 character(s)".to_string()][..])
        );
        assert!(!errors.contains("description"));
    }

    #[test]
    fn test_name_with_spaces_and_uppercase() {
        let errors = validate(&[
            ("name", "My Topic"),
            ("description", "a long enough description"),
        ])
        .unwrap_err();

        assert_eq!(
            errors.get("name"),
            Some(&[SLUG_FORMAT_MESSAGE.to_string()][..])
        );
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["name"]);
    }

    #[test]
    fn test_short_description() {
        let errors = validate(&[("name", "rust-lang"), ("description", "too short")]).unwrap_err();

        assert_eq!(
            errors.get("description"),
            Some(&["String must contain at least 10 character(s)".to_string()][..])
        );
        assert!(!errors.contains("name"));
    }

    #[test]
    fn test_description_of_exactly_ten_characters_passes() {
        assert!(validate(&[("name", "rust-lang"), ("description", "0123456789")]).is_ok());
    }

    #[test]
    fn test_missing_fields() {
        let errors = validate(&[]).unwrap_err();

        assert_eq!(
            errors.get("name"),
            Some(&[MISSING_FIELD_MESSAGE.to_string()][..])
        );
        assert_eq!(
            errors.get("description"),
            Some(&[MISSING_FIELD_MESSAGE.to_string()][..])
        );
    }

    #[test]
    fn test_both_fields_failing() {
        let errors = validate(&[("name", "No"), ("description", "tiny")]).unwrap_err();

        assert_eq!(errors.get("name").map(<[String]>::len), Some(2));
        assert_eq!(errors.get("description").map(<[String]>::len), Some(1));
    }

    #[test]
    fn test_validation_is_deterministic() {
        let fields: &[(&str, &str)] = &[("name", "Bad Name"), ("description", "nope")];
        assert_eq!(validate(fields).unwrap_err(), validate(fields).unwrap_err());
    }
}
