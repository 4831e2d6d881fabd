use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Display label declared for one field.
///
/// In TOML a plain string declares a scalar label, a table declares a
/// structured (JSON) field with per-key labels:
///
/// ```toml
/// name = "Product Name"
/// settings = { label = "Settings", fields = { theme = "Theme" } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Text(String),
    Nested(NestedLabels),
}

/// Labels for the keys inside a structured field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NestedLabels {
    /// Label of the field itself, used when synthesizing missing sub-labels.
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl NestedLabels {
    /// Label for `nested_key`, or `"<outer> (<nested_key>)"` when none is declared.
    pub fn label_for(&self, outer_key: &str, nested_key: &str) -> String {
        match self.fields.get(nested_key) {
            Some(label) => label.clone(),
            None => {
                let outer = self.label.as_deref().unwrap_or(outer_key);
                format!("{outer} ({nested_key})")
            }
        }
    }
}

/// Declared shape of a field's value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Scalar,
    Json,
    Translatable,
}

impl FieldKind {
    pub fn is_structured(self) -> bool {
        !matches!(self, FieldKind::Scalar)
    }
}

/// Static field-name → label mapping for one subject type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMapping {
    labels: BTreeMap<String, Label>,
}

impl LabelMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: map `field` to a plain display label.
    pub fn with_label(mut self, field: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(field.into(), Label::Text(label.into()));
        self
    }

    /// Builder: declare `field` as structured with per-key labels.
    pub fn with_nested(mut self, field: impl Into<String>, nested: NestedLabels) -> Self {
        self.labels.insert(field.into(), Label::Nested(nested));
        self
    }

    pub fn get(&self, field: &str) -> Option<&Label> {
        self.labels.get(field)
    }

    /// Plain text label for `field`, if one is declared.
    pub fn text(&self, field: &str) -> Option<&str> {
        match self.labels.get(field) {
            Some(Label::Text(label)) => Some(label),
            _ => None,
        }
    }

    pub fn nested(&self, field: &str) -> Option<&NestedLabels> {
        match self.labels.get(field) {
            Some(Label::Nested(nested)) => Some(nested),
            _ => None,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (field, label) in iter {
            mapping = mapping.with_label(field, label);
        }
        mapping
    }
}
