//! Form submission plumbing shared by every mutation.
//!
//! A [`FormState`] is what a rejected submission hands back to the caller so
//! the form can be re-rendered with inline errors. Errors are keyed by field
//! name; messages that are not about a single field go under [`FORM_FIELD`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reserved key for errors that are not tied to a submitted field.
pub const FORM_FIELD: &str = "_form";

/// Raw submitted field values. A repeated field yields its first value.
pub trait FormData {
    fn get(&self, name: &str) -> Option<&str>;
}

impl FormData for [(String, String)] {
    fn get(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl FormData for [(&str, &str)] {
    fn get(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }
}

/// Field name to ordered messages. Fields without problems have no entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors consisting of a single form-level message.
    pub fn form(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(FORM_FIELD, message);
        errors
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Add every message for `field`, leaving the map untouched when there are none.
    pub fn extend(&mut self, field: &str, messages: Vec<String>) {
        if messages.is_empty() {
            return;
        }
        self.0.entry(field.to_string()).or_default().extend(messages);
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

/// State returned to the form after a rejected submission.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    pub errors: FieldErrors,
}

impl From<FieldErrors> for FormState {
    fn from(errors: FieldErrors) -> Self {
        FormState { errors }
    }
}
