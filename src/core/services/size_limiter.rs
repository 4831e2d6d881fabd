use serde_json::Value;

use crate::config::entity_config::DEFAULT_MAX_TEXT_LENGTH;
use crate::core::models::attributes::AttributeMap;

/// Appended to strings cut at the limit.
pub const TRUNCATION_SUFFIX: &str = "...";

/// Replaces arrays and objects whose JSON form exceeds the limit.
pub const OVERSIZED_PLACEHOLDER: &str = "[Content too large - truncated]";

/// Keeps individual values small enough to store and broadcast.
///
/// Lengths are counted in characters, never bytes, so multibyte text is
/// never split inside a code point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeLimiter {
    max_length: usize,
}

impl Default for SizeLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TEXT_LENGTH)
    }
}

impl SizeLimiter {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Copy of `attributes` with every oversized value limited.
    pub fn limit(&self, attributes: &AttributeMap) -> AttributeMap {
        attributes
            .iter()
            .map(|(key, value)| (key.clone(), self.limit_value(key, value)))
            .collect()
    }

    fn limit_value(&self, key: &str, value: &Value) -> Value {
        match value {
            Value::String(text) if text.chars().count() > self.max_length => {
                tracing::debug!(
                    field = key,
                    max = self.max_length,
                    "truncating long text value"
                );
                Value::String(self.truncate(text))
            }
            Value::Array(_) | Value::Object(_) => {
                let encoded_len = value.to_string().chars().count();
                if encoded_len > self.max_length {
                    tracing::debug!(
                        field = key,
                        encoded_len,
                        max = self.max_length,
                        "replacing oversized structured value"
                    );
                    Value::String(OVERSIZED_PLACEHOLDER.to_string())
                } else {
                    value.clone()
                }
            }
            _ => value.clone(),
        }
    }

    /// First `max_length` characters, trailing whitespace trimmed, plus the suffix.
    pub fn truncate(&self, text: &str) -> String {
        let cut: String = text.chars().take(self.max_length).collect();
        format!("{}{TRUNCATION_SUFFIX}", cut.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> AttributeMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn default_limit_is_one_thousand() {
        assert_eq!(SizeLimiter::default().max_length(), 1000);
    }

    #[test]
    fn short_values_pass_through() {
        let attrs = map(json!({"name": "Lamp", "active": true, "tags": ["a"]}));
        assert_eq!(SizeLimiter::new(10).limit(&attrs), attrs);
    }

    #[test]
    fn long_strings_are_truncated_with_suffix() {
        let attrs = map(json!({"description": "a".repeat(50)}));
        let limited = SizeLimiter::new(10).limit(&attrs);

        assert_eq!(limited["description"], json!("aaaaaaaaaa..."));
    }

    #[test]
    fn string_exactly_at_limit_is_kept() {
        let attrs = map(json!({"code": "abcdefghij"}));
        let limited = SizeLimiter::new(10).limit(&attrs);
        assert_eq!(limited["code"], json!("abcdefghij"));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "é".repeat(20);
        let attrs = map(json!({"title": text}));
        let limited = SizeLimiter::new(5).limit(&attrs);

        let out = limited["title"].as_str().unwrap();
        assert_eq!(out, "ééééé...");
        assert_eq!(out.chars().count(), 5 + TRUNCATION_SUFFIX.len());
    }

    #[test]
    fn truncation_trims_trailing_whitespace_before_suffix() {
        let limiter = SizeLimiter::new(6);
        assert_eq!(limiter.truncate("hello world"), "hello...");
    }

    #[test]
    fn truncated_output_is_bounded() {
        let limiter = SizeLimiter::new(100);
        let text = "This is a large text content that should be truncated. ".repeat(100);
        let out = limiter.truncate(&text);
        let bound = 100 + TRUNCATION_SUFFIX.chars().count();
        assert!(out.chars().count() <= bound);
    }

    #[test]
    fn oversized_structures_become_placeholder() {
        let attrs = map(json!({
            "tags": (0..100).map(|i| format!("tag-{i}")).collect::<Vec<_>>(),
            "settings": {"theme": "dark"}
        }));
        let limited = SizeLimiter::new(40).limit(&attrs);

        assert_eq!(limited["tags"], json!(OVERSIZED_PLACEHOLDER));
        assert_eq!(limited["settings"], json!({"theme": "dark"}));
    }

    #[test]
    fn numbers_and_nulls_are_never_touched() {
        let attrs = map(json!({"big": 123_456_789_012_u64, "none": null}));
        assert_eq!(SizeLimiter::new(1).limit(&attrs), attrs);
    }
}
