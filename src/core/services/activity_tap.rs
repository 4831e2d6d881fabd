use crate::core::models::audit_record::{AuditEvent, AuditRecord};
use crate::core::models::context::InvocationContext;
use crate::core::models::lifecycle_event::LifecycleEvent;
use crate::core::services::attribute_filter::AttributeFilter;
use crate::core::services::attribute_mapper::AttributeMapper;
use crate::core::services::causer_resolver::CauserResolver;
use crate::core::services::metadata_enricher::MetadataEnricher;
use crate::core::services::size_limiter::SizeLimiter;
use crate::core::traits::auditable::Auditable;
use crate::core::traits::identity::IdentityProvider;

/// What to do with the record after the tap phase.
#[derive(Debug, Clone, PartialEq)]
pub enum TapOutcome {
    Persist(AuditRecord),
    /// Nothing left to log once exclusions and mapping were applied.
    Discard,
}

impl TapOutcome {
    pub fn into_record(self) -> Option<AuditRecord> {
        match self {
            TapOutcome::Persist(record) => Some(record),
            TapOutcome::Discard => None,
        }
    }
}

/// Turns a raw lifecycle event into a labelled, size-bounded audit record.
///
/// Stages run in a fixed order on both `old` and `attributes`:
/// filter → limit → tap hook → map, then the emptiness check, then
/// metadata. The causer is resolved alongside and never fails the tap.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityTap {
    enricher: MetadataEnricher,
    resolver: CauserResolver,
}

impl ActivityTap {
    pub fn new(enricher: MetadataEnricher, resolver: CauserResolver) -> Self {
        Self { enricher, resolver }
    }

    pub fn tap(
        &self,
        subject: &dyn Auditable,
        event: LifecycleEvent,
        context: &InvocationContext,
        identity: &dyn IdentityProvider,
    ) -> TapOutcome {
        let config = subject.audit_config();
        let log_name = config.log_name_for(&event.subject.subject_type);

        let mut record = AuditRecord::new(
            &log_name,
            describe_event(&event.event, &log_name),
            event.event.clone(),
            &event.subject,
        );
        record.batch_uuid = context.batch_uuid;
        record.set_causer(self.resolver.resolve(identity, Some(&event.subject)));

        let limiter = SizeLimiter::new(config.max_text_length);
        let mut old = limiter.limit(&AttributeFilter.filter(&event.old, &config.exclude));
        let mut attributes =
            limiter.limit(&AttributeFilter.filter(&event.attributes, &config.exclude));

        if let Some(hook) = subject.tap_hook() {
            hook.tap(&mut record, &mut old, &mut attributes);
        }

        let mapper = AttributeMapper::new(config);
        let mapped_old = mapper.map(&old);
        let mapped_attributes = mapper.map(&attributes);

        if mapped_old.is_empty() && mapped_attributes.is_empty() {
            tracing::debug!(
                subject = %subject.subject_ref(),
                event = %event.event,
                "nothing left to log, discarding activity"
            );
            return TapOutcome::Discard;
        }

        record.properties.old = mapped_old;
        record.properties.attributes = mapped_attributes;
        record.properties.metadata = self.enricher.enrich(subject, context.request.as_ref());

        TapOutcome::Persist(record)
    }
}

/// Human description of `event` for a log named `log_name`.
pub fn describe_event(event: &AuditEvent, log_name: &str) -> String {
    match event {
        AuditEvent::Created => format!("Created new {log_name}"),
        AuditEvent::Updated => format!("Updated {log_name}"),
        AuditEvent::Deleted => format!("Deleted {log_name}"),
        AuditEvent::Restored => format!("Restored {log_name}"),
        AuditEvent::Custom(name) => format!("This {log_name} has been {name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::entity_config::AuditConfig;
    use crate::core::errors::Result;
    use crate::core::models::attributes::AttributeMap;
    use crate::core::models::audit_record::{CauserRef, SubjectRef};
    use crate::core::models::context::RequestContext;
    use crate::core::models::label_mapping::LabelMapping;
    use crate::core::services::size_limiter::OVERSIZED_PLACEHOLDER;
    use crate::core::traits::auditable::TapHook;
    use serde_json::{Value, json};

    struct Guest;

    impl IdentityProvider for Guest {
        fn is_guest(&self) -> bool {
            true
        }
        fn current(&self) -> Option<CauserRef> {
            None
        }
        fn resolve(&self, _subject: Option<&SubjectRef>) -> Result<Option<CauserRef>> {
            Ok(None)
        }
    }

    struct Admin;

    impl IdentityProvider for Admin {
        fn is_guest(&self) -> bool {
            false
        }
        fn current(&self) -> Option<CauserRef> {
            Some(CauserRef::new("User", "1"))
        }
        fn resolve(&self, _subject: Option<&SubjectRef>) -> Result<Option<CauserRef>> {
            Ok(self.current())
        }
    }

    struct AddReason;

    impl TapHook for AddReason {
        fn tap(
            &self,
            record: &mut AuditRecord,
            old: &mut AttributeMap,
            attributes: &mut AttributeMap,
        ) {
            let custom = &mut record.properties.custom;
            custom.insert("reason".into(), json!("seasonal sale"));
            old.remove("internal_note");
            attributes.remove("internal_note");
        }
    }

    struct Product {
        config: AuditConfig,
        hook: Option<AddReason>,
    }

    impl Auditable for Product {
        fn subject_ref(&self) -> SubjectRef {
            SubjectRef::new("Product", "42")
        }
        fn audit_config(&self) -> &AuditConfig {
            &self.config
        }
        fn attribute(&self, field: &str) -> Option<Value> {
            (field == "sku").then(|| json!("LAMP-42"))
        }
        fn tap_hook(&self) -> Option<&dyn TapHook> {
            self.hook.as_ref().map(|h| h as &dyn TapHook)
        }
    }

    fn product() -> Product {
        Product {
            config: AuditConfig::new()
                .with_labels(
                    LabelMapping::new()
                        .with_label("name", "Product Name")
                        .with_label("price", "Price")
                        .with_label("status", "Status"),
                )
                .excluding(["updated_at"]),
            hook: None,
        }
    }

    fn map(value: Value) -> AttributeMap {
        value.as_object().cloned().unwrap()
    }

    fn updated(old: Value, attributes: Value) -> LifecycleEvent {
        LifecycleEvent::new(
            "updated",
            SubjectRef::new("Product", "42"),
            map(old),
            map(attributes),
        )
    }

    #[test]
    fn maps_labels_on_update() {
        let outcome = ActivityTap::default().tap(
            &product(),
            updated(
                json!({"price": 999.99, "status": "active"}),
                json!({"price": 899.99, "status": "on_sale"}),
            ),
            &InvocationContext::default(),
            &Guest,
        );

        let record = outcome.into_record().unwrap();
        assert_eq!(record.log_name, "Product");
        assert_eq!(record.description, "Updated Product");
        assert_eq!(
            record.properties.attributes,
            map(json!({"Price": 899.99, "Status": "on_sale"}))
        );
        assert_eq!(
            record.properties.old,
            map(json!({"Price": 999.99, "Status": "active"}))
        );
        assert!(record.properties.metadata.is_none());
        assert!(record.causer().is_none());
    }

    #[test]
    fn excluded_only_change_is_discarded() {
        let outcome = ActivityTap::default().tap(
            &product(),
            updated(
                json!({"updated_at": "2026-01-01"}),
                json!({"updated_at": "2026-02-01"}),
            ),
            &InvocationContext::default(),
            &Guest,
        );

        assert_eq!(outcome, TapOutcome::Discard);
    }

    #[test]
    fn blank_only_change_is_discarded() {
        let outcome = ActivityTap::default().tap(
            &product(),
            updated(json!({"name": null}), json!({"name": ""})),
            &InvocationContext::default(),
            &Guest,
        );

        assert_eq!(outcome, TapOutcome::Discard);
    }

    #[test]
    fn long_text_is_limited_before_mapping() {
        let mut subject = product();
        subject.config.max_text_length = 20;
        let attributes = json!({
            "name": "x".repeat(100),
            "tags": vec!["long-tag-value"; 10],
        });
        let outcome = ActivityTap::default().tap(
            &subject,
            LifecycleEvent::new(
                "created",
                SubjectRef::new("Product", "42"),
                AttributeMap::new(),
                map(attributes),
            ),
            &InvocationContext::default(),
            &Guest,
        );

        let record = outcome.into_record().unwrap();
        assert_eq!(record.description, "Created new Product");
        let attributes = &record.properties.attributes;
        let expected = format!("{}...", "x".repeat(20));
        assert_eq!(attributes["Product Name"], json!(expected));
        assert_eq!(attributes["tags"], json!(OVERSIZED_PLACEHOLDER));
        assert!(record.properties.old.is_empty());
    }

    #[test]
    fn hook_runs_before_mapping() {
        let mut subject = product();
        subject.hook = Some(AddReason);
        let outcome = ActivityTap::default().tap(
            &subject,
            updated(
                json!({"price": 10, "internal_note": "a"}),
                json!({"price": 8, "internal_note": "b"}),
            ),
            &InvocationContext::default(),
            &Guest,
        );

        let record = outcome.into_record().unwrap();
        assert_eq!(record.properties.custom["reason"], json!("seasonal sale"));
        assert_eq!(record.properties.attributes, map(json!({"Price": 8})));
    }

    #[test]
    fn hook_can_empty_the_record() {
        let mut subject = product();
        subject.hook = Some(AddReason);
        let outcome = ActivityTap::default().tap(
            &subject,
            updated(json!({"internal_note": "a"}), json!({"internal_note": "b"})),
            &InvocationContext::default(),
            &Guest,
        );

        assert_eq!(outcome, TapOutcome::Discard);
    }

    #[test]
    fn metadata_and_causer_are_attached() {
        let mut subject = product();
        subject.config = subject
            .config
            .with_metadata(true)
            .with_additional_data("sku", "SKU");
        let context = InvocationContext {
            request: Some(RequestContext::new("198.51.100.4", "curl/8.0")),
            batch_uuid: Some(uuid::Uuid::nil()),
        };

        let event = updated(json!({"price": 1}), json!({"price": 2}));
        let record = ActivityTap::default()
            .tap(&subject, event, &context, &Admin)
            .into_record()
            .unwrap();

        let metadata = record.properties.metadata.clone().unwrap();
        assert_eq!(
            metadata.device_info.unwrap().ip_address.as_deref(),
            Some("198.51.100.4")
        );
        assert_eq!(metadata.context.unwrap()["SKU"], json!("LAMP-42"));
        assert_eq!(record.causer(), Some(CauserRef::new("User", "1")));
        assert_eq!(record.batch_uuid, Some(uuid::Uuid::nil()));
    }

    #[test]
    fn custom_log_name_flows_into_description() {
        let mut subject = product();
        subject.config.log_name = Some("catalog".into());
        let record = ActivityTap::default()
            .tap(
                &subject,
                LifecycleEvent::new(
                    "published",
                    SubjectRef::new("Product", "42"),
                    AttributeMap::new(),
                    map(json!({"status": "live"})),
                ),
                &InvocationContext::default(),
                &Guest,
            )
            .into_record()
            .unwrap();

        assert_eq!(record.log_name, "catalog");
        assert_eq!(record.description, "This catalog has been published");
    }

    #[test]
    fn describes_standard_events() {
        let post = |event: AuditEvent| describe_event(&event, "Post");
        assert_eq!(post(AuditEvent::Created), "Created new Post");
        assert_eq!(post(AuditEvent::Updated), "Updated Post");
        assert_eq!(post(AuditEvent::Deleted), "Deleted Post");
        assert_eq!(post(AuditEvent::Restored), "Restored Post");
    }
}
