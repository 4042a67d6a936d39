use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::draft::DraftField;

/// Per-field validation messages, ordered like the form
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationErrors(BTreeMap<DraftField, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: DraftField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Drop the message for a field once the user edits it
    pub fn clear_field(&mut self, field: DraftField) {
        self.0.remove(&field);
    }

    pub fn get(&self, field: DraftField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DraftField, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, msg)| format!("{}: {}", field, msg))
            .collect();
        f.write_str(&parts.join("; "))
    }
}
