use std::collections::BTreeMap;

use crate::config::app_config::CollectSection;
use crate::core::models::attributes::AttributeMap;
use crate::core::models::context::RequestContext;
use crate::core::models::metadata::{DeviceInfo, MetadataBlock};
use crate::core::traits::auditable::Auditable;

/// Builds the optional `metadata` block: requester device, computed
/// context values and snapshots of loaded relations.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataEnricher {
    collect: CollectSection,
}

impl MetadataEnricher {
    pub fn new(collect: CollectSection) -> Self {
        Self { collect }
    }

    /// Metadata for a change to `subject`, or `None` when no section applies.
    pub fn enrich(
        &self,
        subject: &dyn Auditable,
        request: Option<&RequestContext>,
    ) -> Option<MetadataBlock> {
        let config = subject.audit_config();
        let device_info = config.log_metadata.then(|| self.device_info(request));
        let context = additional_data(subject);
        let related = relationships_data(subject);

        assemble(device_info, context, related)
    }

    /// Requester details, with fields the collect settings turn off left empty.
    pub fn device_info(&self, request: Option<&RequestContext>) -> DeviceInfo {
        let request = request.cloned().unwrap_or_default();
        let collect = self.collect;

        DeviceInfo {
            user_agent: collect.user_agent.then_some(request.user_agent).flatten(),
            ip_address: collect.ip_address.then_some(request.ip_address).flatten(),
            session_id: collect.session_id.then_some(request.session_id).flatten(),
            request_url: collect.request_url.then_some(request.request_url).flatten(),
        }
    }
}

/// Combine sections into a block; empty context/related maps are left out
/// and a block with nothing in it is `None`.
pub fn assemble(
    device_info: Option<DeviceInfo>,
    context: AttributeMap,
    related: BTreeMap<String, AttributeMap>,
) -> Option<MetadataBlock> {
    let block = MetadataBlock {
        device_info,
        context: (!context.is_empty()).then_some(context),
        related: (!related.is_empty()).then_some(related),
    };
    (!block.is_empty()).then_some(block)
}

/// `label → value` for every declared additional-data field the subject can
/// provide, preferring its computed accessor over the stored attribute.
pub fn additional_data(subject: &dyn Auditable) -> AttributeMap {
    let config = subject.audit_config();
    let mut data = AttributeMap::new();

    for (field, label) in &config.additional_data {
        if let Some(value) = subject.accessor(field).or_else(|| subject.attribute(field)) {
            data.insert(label.clone(), value);
        }
    }
    data
}

/// Selected fields of each declared relation that is already loaded.
///
/// Fields the related entity does not have are skipped, and a relation
/// with none of its fields present is left out.
pub fn relationships_data(subject: &dyn Auditable) -> BTreeMap<String, AttributeMap> {
    let config = subject.audit_config();
    let mut data = BTreeMap::new();

    for (relation, fields) in &config.relationships {
        let Some(related) = subject.loaded_relation(relation) else {
            continue;
        };

        let snapshot: AttributeMap = fields
            .iter()
            .filter_map(|field| Some((field.clone(), related.get(field)?.clone())))
            .collect();

        if !snapshot.is_empty() {
            data.insert(relation.clone(), snapshot);
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::entity_config::AuditConfig;
    use crate::core::models::audit_record::SubjectRef;
    use serde_json::{Value, json};

    struct Product {
        config: AuditConfig,
        attributes: AttributeMap,
        category: Option<AttributeMap>,
    }

    impl Auditable for Product {
        fn subject_ref(&self) -> SubjectRef {
            SubjectRef::new("Product", "7")
        }

        fn audit_config(&self) -> &AuditConfig {
            &self.config
        }

        fn attribute(&self, field: &str) -> Option<Value> {
            self.attributes.get(field).cloned()
        }

        fn accessor(&self, field: &str) -> Option<Value> {
            (field == "custom_id").then(|| json!("product-7"))
        }

        fn loaded_relation(&self, relation: &str) -> Option<AttributeMap> {
            match relation {
                "category" => self.category.clone(),
                _ => None,
            }
        }
    }

    fn map(value: Value) -> AttributeMap {
        value.as_object().cloned().unwrap()
    }

    fn product(config: AuditConfig) -> Product {
        Product {
            config,
            attributes: map(json!({"sku": "LAMP-1", "custom_id": "raw"})),
            category: Some(map(json!({"name": "Lighting", "slug": "lighting"}))),
        }
    }

    fn request() -> RequestContext {
        RequestContext {
            ip_address: Some("203.0.113.9".into()),
            user_agent: Some("Mozilla/5.0".into()),
            session_id: Some("sess-1".into()),
            request_url: Some("https://shop.test/products/7".into()),
        }
    }

    #[test]
    fn nothing_configured_means_no_block() {
        let subject = product(AuditConfig::new());
        let enricher = MetadataEnricher::default();
        assert!(enricher.enrich(&subject, Some(&request())).is_none());
    }

    #[test]
    fn device_info_only_when_metadata_enabled() {
        let enricher = MetadataEnricher::default();

        let off = product(AuditConfig::new().with_metadata(false));
        assert!(enricher.enrich(&off, Some(&request())).is_none());

        let on = product(AuditConfig::new().with_metadata(true));
        let block = enricher.enrich(&on, Some(&request())).unwrap();
        let device = block.device_info.unwrap();
        assert_eq!(device.ip_address.as_deref(), Some("203.0.113.9"));
        assert_eq!(device.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert!(device.session_id.is_none());
        assert!(device.request_url.is_none());
        assert!(block.context.is_none());
        assert!(block.related.is_none());
    }

    #[test]
    fn device_info_without_request_is_empty_not_missing() {
        let subject = product(AuditConfig::new().with_metadata(true));
        let block = MetadataEnricher::default().enrich(&subject, None).unwrap();

        assert_eq!(block.device_info, Some(DeviceInfo::default()));
    }

    #[test]
    fn collect_settings_choose_device_fields() {
        let enricher = MetadataEnricher::new(CollectSection {
            ip_address: false,
            user_agent: true,
            session_id: true,
            request_url: true,
        });
        let device = enricher.device_info(Some(&request()));

        assert!(device.ip_address.is_none());
        assert_eq!(device.session_id.as_deref(), Some("sess-1"));
        assert_eq!(
            device.request_url.as_deref(),
            Some("https://shop.test/products/7")
        );
    }

    #[test]
    fn additional_data_prefers_accessor() {
        let subject = product(
            AuditConfig::new()
                .with_additional_data("custom_id", "Model ID")
                .with_additional_data("sku", "SKU")
                .with_additional_data("missing", "Missing"),
        );
        let data = additional_data(&subject);

        assert_eq!(data["Model ID"], json!("product-7"));
        assert_eq!(data["SKU"], json!("LAMP-1"));
        assert!(!data.contains_key("Missing"));
    }

    #[test]
    fn context_section_when_additional_data_present() {
        let subject = product(AuditConfig::new().with_additional_data("sku", "SKU"));
        let block = MetadataEnricher::default().enrich(&subject, None).unwrap();

        assert!(block.device_info.is_none());
        assert_eq!(block.context.unwrap()["SKU"], json!("LAMP-1"));
    }

    #[test]
    fn related_only_for_loaded_relations_and_existing_fields() {
        let subject = product(
            AuditConfig::new()
                .with_relationship("category", ["name", "color"])
                .with_relationship("brand", ["name"]),
        );
        let related = relationships_data(&subject);

        assert_eq!(related.len(), 1);
        assert_eq!(related["category"], map(json!({"name": "Lighting"})));
    }

    #[test]
    fn relation_without_selected_fields_is_skipped() {
        let subject = product(AuditConfig::new().with_relationship("category", ["color"]));
        assert!(relationships_data(&subject).is_empty());

        let enricher = MetadataEnricher::default();
        assert!(enricher.enrich(&subject, None).is_none());
    }

    #[test]
    fn unloaded_relation_is_skipped() {
        let mut subject = product(AuditConfig::new().with_relationship("category", ["name"]));
        subject.category = None;
        assert!(relationships_data(&subject).is_empty());
    }
}
