use serde_json::Value;

use crate::config::entity_config::AuditConfig;
use crate::core::models::attributes::{AttributeMap, is_blank};
use crate::core::models::label_mapping::Label;

/// Deepest level of a structured value that is spread into dotted keys.
/// Anything below is stored as its JSON text.
pub const MAX_FLATTEN_DEPTH: usize = 3;

/// Renames fields to their display labels and spreads structured
/// (JSON / translatable) fields into one entry per key.
pub struct AttributeMapper<'a> {
    config: &'a AuditConfig,
}

impl<'a> AttributeMapper<'a> {
    pub fn new(config: &'a AuditConfig) -> Self {
        Self { config }
    }

    /// Labelled copy of `attributes`.
    ///
    /// Output keeps the order in which labels are first produced. When two
    /// fields end up with the same label the later value wins. Entries with
    /// an empty label or a blank value (`null`, `""`, `[]`, `{}`) are dropped.
    ///
    /// Falsy scalars are not blank: `0`, `false` and `"0"` are kept.
    pub fn map(&self, attributes: &AttributeMap) -> AttributeMap {
        let mut mapped = AttributeMap::new();

        for (key, value) in attributes {
            if self.config.field_kind(key).is_structured()
                && let Some(decoded) = decode_structured(key, value)
            {
                self.map_structured(key, &decoded, &mut mapped);
                continue;
            }
            mapped.insert(self.scalar_label(key), value.clone());
        }

        mapped.retain(|label, value| !label.is_empty() && !is_blank(value));
        mapped
    }

    fn scalar_label(&self, key: &str) -> String {
        match self.config.labels.get(key) {
            Some(Label::Text(label)) => label.clone(),
            // A nested mapping on a value that is not JSON: keep the raw key
            // rather than invent a label from the mapping.
            Some(Label::Nested(_)) | None => key.to_string(),
        }
    }

    fn map_structured(&self, key: &str, decoded: &AttributeMap, out: &mut AttributeMap) {
        match self.config.labels.nested(key) {
            Some(nested) => {
                for (nested_key, nested_value) in decoded {
                    out.insert(nested.label_for(key, nested_key), nested_value.clone());
                }
            }
            None => self.flatten(key, decoded, 1, out),
        }
    }

    fn flatten(&self, prefix: &str, fields: &AttributeMap, depth: usize, out: &mut AttributeMap) {
        for (child_key, child_value) in fields {
            let path = format!("{prefix}.{child_key}");
            match child_value {
                Value::Object(child) if depth < MAX_FLATTEN_DEPTH => {
                    self.flatten(&path, child, depth + 1, out);
                }
                Value::Object(_) => {
                    let text = Value::String(child_value.to_string());
                    out.insert(self.path_label(&path), text);
                }
                _ => {
                    out.insert(self.path_label(&path), child_value.clone());
                }
            }
        }
    }

    fn path_label(&self, path: &str) -> String {
        self.config
            .labels
            .text(path)
            .map(str::to_string)
            .unwrap_or_else(|| path.to_string())
    }
}

/// Object form of a structured field's value, whether it arrives decoded
/// or as JSON text. `None` means: treat it as a plain scalar.
fn decode_structured(key: &str, value: &Value) -> Option<AttributeMap> {
    match value {
        Value::Object(fields) => Some(fields.clone()),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(fields)) => Some(fields),
            Ok(_) => {
                tracing::debug!(field = key, "structured field is not a JSON object");
                None
            }
            Err(e) => {
                tracing::debug!(field = key, error = %e, "structured field is not valid JSON");
                None
            }
        },
        _ => None,
    }
}
