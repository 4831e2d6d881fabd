use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::adapters::identity::static_identity::StaticIdentity;
use crate::adapters::subjects::declared_subject::DeclaredSubject;
use crate::config::entity_config::AuditConfig;
use crate::core::errors::{LoggableError, Result};
use crate::core::models::attributes::AttributeMap;
use crate::core::models::audit_record::{AuditEvent, CauserRef, SubjectRef};
use crate::core::models::context::{InvocationContext, RequestContext};
use crate::core::models::lifecycle_event::LifecycleEvent;
use crate::core::services::change_tracker::ChangeTracker;

/// A lifecycle event described as JSON, as fed to `loggable tap`.
///
/// Changes come either pre-computed (`old` / `attributes`) or as full
/// `before` / `after` snapshots that are diffed with the entity's log
/// options.
#[derive(Debug, Clone, Deserialize)]
pub struct EventFile {
    pub event: String,
    pub subject_type: String,
    pub subject_id: Value,
    #[serde(default)]
    pub old: Option<AttributeMap>,
    #[serde(default)]
    pub attributes: Option<AttributeMap>,
    #[serde(default)]
    pub before: Option<AttributeMap>,
    #[serde(default)]
    pub after: Option<AttributeMap>,
    /// Current attributes of the entity, for additional data.
    #[serde(default)]
    pub subject: Option<AttributeMap>,
    /// Relations that were loaded when the change happened.
    #[serde(default)]
    pub relations: BTreeMap<String, AttributeMap>,
    #[serde(default)]
    pub request: Option<RequestContext>,
    #[serde(default)]
    pub causer: Option<CauserRef>,
    #[serde(default)]
    pub batch_uuid: Option<Uuid>,
}

impl EventFile {
    pub fn parse(content: &str) -> Result<Self> {
        let file: Self = serde_json::from_str(content).map_err(|e| LoggableError::InvalidEvent {
            detail: e.to_string(),
        })?;

        if file.event.trim().is_empty() {
            return Err(LoggableError::InvalidEvent {
                detail: "'event' must not be empty".into(),
            });
        }
        if file.subject_type.trim().is_empty() {
            return Err(LoggableError::InvalidEvent {
                detail: "'subject_type' must not be empty".into(),
            });
        }
        file.subject_id()?;

        let has_changes = file.old.is_some() || file.attributes.is_some();
        let has_snapshots = file.before.is_some() || file.after.is_some();
        if !has_changes && !has_snapshots {
            return Err(LoggableError::InvalidEvent {
                detail: "no changes given".into(),
            });
        }

        Ok(file)
    }

    pub fn subject_ref(&self) -> Result<SubjectRef> {
        Ok(SubjectRef::new(&self.subject_type, self.subject_id()?))
    }

    fn subject_id(&self) -> Result<String> {
        match &self.subject_id {
            Value::String(id) if !id.is_empty() => Ok(id.clone()),
            Value::Number(id) => Ok(id.to_string()),
            other => Err(LoggableError::InvalidEvent {
                detail: format!("'subject_id' must be a string or number, got {other}"),
            }),
        }
    }

    /// The event as the pipeline sees it.
    pub fn lifecycle_event(&self, config: &AuditConfig) -> Result<LifecycleEvent> {
        let event = AuditEvent::from(self.event.as_str());

        let (old, attributes) = if self.old.is_some() || self.attributes.is_some() {
            (
                self.old.clone().unwrap_or_default(),
                self.attributes.clone().unwrap_or_default(),
            )
        } else {
            ChangeTracker.changes(
                &event,
                self.before.as_ref(),
                self.after.as_ref(),
                &config.log_options(&self.subject_type),
            )
        };

        let subject = self.subject_ref()?;
        Ok(LifecycleEvent::new(event, subject, old, attributes))
    }

    /// The entity, falling back to the latest snapshot for its attributes.
    pub fn declared_subject(&self, config: Arc<AuditConfig>) -> Result<DeclaredSubject> {
        let attributes = self
            .subject
            .as_ref()
            .or(self.after.as_ref())
            .or(self.attributes.as_ref())
            .or(self.before.as_ref())
            .cloned()
            .unwrap_or_default();

        let subject_ref = self.subject_ref()?;
        let mut subject = DeclaredSubject::new(subject_ref, config).with_attributes(attributes);
        for (name, related) in &self.relations {
            subject = subject.with_relation(name, related.clone());
        }
        Ok(subject)
    }

    pub fn invocation_context(&self) -> InvocationContext {
        InvocationContext {
            request: self.request.clone(),
            batch_uuid: self.batch_uuid,
        }
    }

    pub fn identity(&self) -> StaticIdentity {
        self.causer
            .clone()
            .map(StaticIdentity::new)
            .unwrap_or_else(StaticIdentity::guest)
    }
}
