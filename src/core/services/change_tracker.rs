use serde_json::Value;

use crate::config::entity_config::LogOptions;
use crate::core::models::attributes::AttributeMap;
use crate::core::models::audit_record::AuditEvent;

/// Derives the `old`/`attributes` pair of a lifecycle event from full
/// before/after snapshots of an entity.
///
/// Only `updated` events carry `old`. With `log_only_dirty`, an update
/// keeps just the tracked fields whose value changed.
pub struct ChangeTracker;

impl ChangeTracker {
    pub fn changes(
        &self,
        event: &AuditEvent,
        before: Option<&AttributeMap>,
        after: Option<&AttributeMap>,
        options: &LogOptions,
    ) -> (AttributeMap, AttributeMap) {
        let empty = AttributeMap::new();

        if *event != AuditEvent::Updated {
            let snapshot = after.or(before).unwrap_or(&empty);
            return (AttributeMap::new(), tracked(snapshot, options));
        }

        let mut attributes = tracked(after.unwrap_or(&empty), options);
        let before = before.unwrap_or(&empty);
        let mut old: AttributeMap = attributes
            .keys()
            .map(|key| {
                let value = before.get(key).cloned().unwrap_or(Value::Null);
                (key.clone(), value)
            })
            .collect();

        if options.log_only_dirty {
            attributes.retain(|key, value| old.get(key) != Some(&*value));
            old.retain(|key, _| attributes.contains_key(key));
        }

        (old, attributes)
    }
}

fn tracked(snapshot: &AttributeMap, options: &LogOptions) -> AttributeMap {
    snapshot
        .iter()
        .filter(|(key, _)| options.logs_attribute(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::entity_config::AuditConfig;
    use crate::core::models::label_mapping::LabelMapping;
    use serde_json::json;

    fn map(value: Value) -> AttributeMap {
        value.as_object().cloned().unwrap()
    }

    fn options(fields: &[&str]) -> LogOptions {
        let labels: LabelMapping = fields.iter().map(|f| (*f, *f)).collect();
        let config = AuditConfig::new().with_labels(labels);
        config.log_options("Product")
    }

    #[test]
    fn update_keeps_only_changed_fields() {
        let before = map(json!({"name": "Lamp", "price": 12.5, "status": "active"}));
        let after = map(json!({"name": "Lamp", "price": 9.5, "status": "sale"}));

        let (old, attributes) = ChangeTracker.changes(
            &AuditEvent::Updated,
            Some(&before),
            Some(&after),
            &options(&["name", "price", "status"]),
        );

        assert_eq!(old, map(json!({"price": 12.5, "status": "active"})));
        assert_eq!(attributes, map(json!({"price": 9.5, "status": "sale"})));
    }

    #[test]
    fn untracked_fields_are_ignored() {
        let before = map(json!({"price": 1, "updated_at": "a"}));
        let after = map(json!({"price": 2, "updated_at": "b"}));

        let (old, attributes) = ChangeTracker.changes(
            &AuditEvent::Updated,
            Some(&before),
            Some(&after),
            &options(&["price"]),
        );

        assert_eq!(old, map(json!({"price": 1})));
        assert_eq!(attributes, map(json!({"price": 2})));
    }

    #[test]
    fn new_fields_have_null_old_value() {
        let before = map(json!({}));
        let after = map(json!({"color": "red"}));

        let (old, _) = ChangeTracker.changes(
            &AuditEvent::Updated,
            Some(&before),
            Some(&after),
            &AuditConfig::new().log_options("Product"),
        );

        assert_eq!(old, map(json!({"color": null})));
    }

    #[test]
    fn dirty_tracking_off_keeps_unchanged_fields() {
        let mut config = AuditConfig::new();
        config.log_only_dirty = false;
        let snapshot = map(json!({"name": "Lamp", "price": 5}));
        let changed = map(json!({"name": "Lamp", "price": 6}));

        let (old, attributes) = ChangeTracker.changes(
            &AuditEvent::Updated,
            Some(&snapshot),
            Some(&changed),
            &config.log_options("Product"),
        );

        assert_eq!(old.len(), 2);
        assert_eq!(attributes.len(), 2);
    }

    #[test]
    fn created_logs_attributes_only() {
        let after = map(json!({"name": "Lamp"}));
        let (old, attributes) = ChangeTracker.changes(
            &AuditEvent::Created,
            None,
            Some(&after),
            &AuditConfig::new().log_options("Product"),
        );

        assert!(old.is_empty());
        assert_eq!(attributes, after);
    }

    #[test]
    fn deleted_logs_last_known_values() {
        let before = map(json!({"name": "Lamp"}));
        let (old, attributes) = ChangeTracker.changes(
            &AuditEvent::Deleted,
            Some(&before),
            None,
            &AuditConfig::new().log_options("Product"),
        );

        assert!(old.is_empty());
        assert_eq!(attributes, before);
    }
}
