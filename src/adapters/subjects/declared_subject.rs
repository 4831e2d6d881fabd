use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::config::entity_config::AuditConfig;
use crate::core::models::attributes::AttributeMap;
use crate::core::models::audit_record::SubjectRef;
use crate::core::traits::auditable::Auditable;

/// A subject known only through data: its current attributes and the
/// relations that came loaded with it. Used when events arrive from
/// outside the process (event files, queues).
#[derive(Debug, Clone)]
pub struct DeclaredSubject {
    subject: SubjectRef,
    config: Arc<AuditConfig>,
    attributes: AttributeMap,
    relations: BTreeMap<String, AttributeMap>,
}

impl DeclaredSubject {
    pub fn new(subject: SubjectRef, config: Arc<AuditConfig>) -> Self {
        Self {
            subject,
            config,
            attributes: AttributeMap::new(),
            relations: BTreeMap::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: AttributeMap) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_relation(mut self, name: impl Into<String>, attributes: AttributeMap) -> Self {
        self.relations.insert(name.into(), attributes);
        self
    }
}

impl Auditable for DeclaredSubject {
    fn subject_ref(&self) -> SubjectRef {
        self.subject.clone()
    }

    fn audit_config(&self) -> &AuditConfig {
        &self.config
    }

    fn attribute(&self, field: &str) -> Option<Value> {
        self.attributes.get(field).cloned()
    }

    fn loaded_relation(&self, relation: &str) -> Option<AttributeMap> {
        self.relations
            .get(relation)
            .filter(|attributes| !attributes.is_empty())
            .cloned()
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
    fn exposes_attributes_and_loaded_relations() {
        let subject = DeclaredSubject::new(
            SubjectRef::new("Product", "1"),
            Arc::new(AuditConfig::new()),
        )
        .with_attributes(map(json!({"sku": "LAMP-1"})))
        .with_relation("category", map(json!({"name": "Lighting"})))
        .with_relation("brand", AttributeMap::new());

        assert_eq!(subject.attribute("sku"), Some(json!("LAMP-1")));
        assert!(subject.attribute("missing").is_none());
        assert!(subject.accessor("sku").is_none());
        assert!(subject.loaded_relation("category").is_some());
        assert!(subject.loaded_relation("brand").is_none());
        assert!(subject.loaded_relation("tags").is_none());
    }
}
