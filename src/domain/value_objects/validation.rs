use std::collections::BTreeMap;
use std::fmt::Display;

use serde::Serialize;

/// Field-level validation outcome. An empty map means the input is valid;
/// a non-empty map blocks persistence and is surfaced to the client as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.0.keys().copied().collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}
