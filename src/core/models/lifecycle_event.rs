use super::attributes::AttributeMap;
use super::audit_record::{AuditEvent, SubjectRef};

/// A persistence-lifecycle event as reported by the change tracker:
/// the dirty attributes before (`old`) and after (`attributes`) the change.
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleEvent {
    pub event: AuditEvent,
    pub subject: SubjectRef,
    pub old: AttributeMap,
    pub attributes: AttributeMap,
}

impl LifecycleEvent {
    pub fn new(
        event: impl Into<AuditEvent>,
        subject: SubjectRef,
        old: AttributeMap,
        attributes: AttributeMap,
    ) -> Self {
        Self {
            event: event.into(),
            subject,
            old,
            attributes,
        }
    }
}
