use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::attributes::AttributeMap;
use super::metadata::MetadataBlock;

/// Lifecycle event an audit record describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuditEvent {
    Created,
    Updated,
    Deleted,
    Restored,
    Custom(String),
}

impl AuditEvent {
    pub fn as_str(&self) -> &str {
        match self {
            AuditEvent::Created => "created",
            AuditEvent::Updated => "updated",
            AuditEvent::Deleted => "deleted",
            AuditEvent::Restored => "restored",
            AuditEvent::Custom(name) => name,
        }
    }
}

impl From<&str> for AuditEvent {
    fn from(name: &str) -> Self {
        match name {
            "created" => AuditEvent::Created,
            "updated" => AuditEvent::Updated,
            "deleted" => AuditEvent::Deleted,
            "restored" => AuditEvent::Restored,
            other => AuditEvent::Custom(other.to_string()),
        }
    }
}

impl From<String> for AuditEvent {
    fn from(name: String) -> Self {
        AuditEvent::from(name.as_str())
    }
}

impl From<AuditEvent> for String {
    fn from(event: AuditEvent) -> Self {
        event.as_str().to_string()
    }
}

impl std::fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type + id of the entity a record describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectRef {
    #[serde(rename = "type")]
    pub subject_type: String,
    pub id: String,
}

impl SubjectRef {
    pub fn new(subject_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            subject_type: subject_type.into(),
            id: id.into(),
        }
    }
}

impl std::fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.subject_type, self.id)
    }
}

/// Type + id of the identity credited with an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CauserRef {
    #[serde(rename = "type")]
    pub causer_type: String,
    pub id: String,
}

impl CauserRef {
    pub fn new(causer_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            causer_type: causer_type.into(),
            id: id.into(),
        }
    }
}

impl std::fmt::Display for CauserRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.causer_type, self.id)
    }
}

/// Structured payload of a record: mapped `old`/`attributes`, optional
/// `metadata`, plus any custom properties added by a tap hook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(default)]
    pub old: AttributeMap,
    #[serde(default)]
    pub attributes: AttributeMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataBlock>,
    #[serde(flatten)]
    pub custom: AttributeMap,
}

/// One logged activity, laid out like a row of the `activity_log` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Assigned by the store on persist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub log_name: String,
    pub description: String,
    pub event: AuditEvent,
    pub subject_type: String,
    pub subject_id: String,
    pub causer_type: Option<String>,
    pub causer_id: Option<String>,
    pub properties: Properties,
    pub batch_uuid: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Fresh, unpersisted record for `subject` with an empty property bag.
    pub fn new(
        log_name: impl Into<String>,
        description: impl Into<String>,
        event: AuditEvent,
        subject: &SubjectRef,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            log_name: log_name.into(),
            description: description.into(),
            event,
            subject_type: subject.subject_type.clone(),
            subject_id: subject.id.clone(),
            causer_type: None,
            causer_id: None,
            properties: Properties::default(),
            batch_uuid: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn subject(&self) -> SubjectRef {
        SubjectRef::new(&self.subject_type, &self.subject_id)
    }

    pub fn causer(&self) -> Option<CauserRef> {
        match (&self.causer_type, &self.causer_id) {
            (Some(causer_type), Some(id)) => Some(CauserRef::new(causer_type, id)),
            _ => None,
        }
    }

    pub fn set_causer(&mut self, causer: Option<CauserRef>) {
        let (causer_type, causer_id) = match causer {
            Some(c) => (Some(c.causer_type), Some(c.id)),
            None => (None, None),
        };
        self.causer_type = causer_type;
        self.causer_id = causer_id;
    }
}
