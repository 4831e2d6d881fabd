use serde_json::Value;

use crate::config::entity_config::AuditConfig;
use crate::core::models::attributes::AttributeMap;
use crate::core::models::audit_record::{AuditRecord, SubjectRef};

/// Port implemented by every entity whose changes are logged.
pub trait Auditable {
    /// Type + id of this entity.
    fn subject_ref(&self) -> SubjectRef;

    /// Static configuration for this entity's type.
    fn audit_config(&self) -> &AuditConfig;

    /// Raw stored value of `field`, if the entity has it.
    fn attribute(&self, field: &str) -> Option<Value>;

    /// Computed value for `field`. Preferred over [`Auditable::attribute`]
    /// when collecting additional log data.
    fn accessor(&self, _field: &str) -> Option<Value> {
        None
    }

    /// Attributes of an already-loaded relation.
    ///
    /// Returns `None` when the relation is not loaded or is empty.
    /// Implementations must not fetch anything here.
    fn loaded_relation(&self, _relation: &str) -> Option<AttributeMap> {
        None
    }

    /// Optional per-entity hook run between size limiting and mapping.
    fn tap_hook(&self) -> Option<&dyn TapHook> {
        None
    }
}

/// Capability for entities that adjust the record before it is mapped.
///
/// `old` and `attributes` are already filtered and size-limited; changes
/// made here are what gets mapped to labels.
pub trait TapHook {
    fn tap(&self, record: &mut AuditRecord, old: &mut AttributeMap, attributes: &mut AttributeMap);
}
