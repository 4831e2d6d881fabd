use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use crate::core::errors::{LoggableError, Result};
use crate::core::models::label_mapping::{FieldKind, LabelMapping};

/// Default cut-off for text values before they are truncated.
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 1000;

/// Everything the pipeline needs to know about one subject type:
/// labels, exclusions, structured fields, metadata sources.
///
/// Built once at startup and shared read-only (see [`EntityRegistry`]).
#[derive(Debug, Clone, PartialEq)]
pub struct AuditConfig {
    /// Overrides the log name; defaults to the subject type.
    pub log_name: Option<String>,
    pub log_metadata: bool,
    pub log_only_dirty: bool,
    pub max_text_length: usize,
    pub labels: LabelMapping,
    pub exclude: BTreeSet<String>,
    pub translatable: BTreeSet<String>,
    pub json_fields: BTreeSet<String>,
    /// Computed field → label, collected into `metadata.context`.
    pub additional_data: BTreeMap<String, String>,
    /// Relation name → fields to snapshot into `metadata.related`.
    pub relationships: BTreeMap<String, Vec<String>>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            log_name: None,
            log_metadata: false,
            log_only_dirty: true,
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
            labels: LabelMapping::default(),
            exclude: BTreeSet::new(),
            translatable: BTreeSet::new(),
            json_fields: BTreeSet::new(),
            additional_data: BTreeMap::new(),
            relationships: BTreeMap::new(),
        }
    }
}

/// Options handed to the change tracker that feeds the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOptions {
    /// Attributes to track; `["*"]` means all of them.
    pub log_only: Vec<String>,
    pub log_name: String,
    pub log_only_dirty: bool,
    pub submit_empty_logs: bool,
}

impl LogOptions {
    pub fn logs_attribute(&self, field: &str) -> bool {
        self.log_only.iter().any(|f| f == "*" || f == field)
    }
}

impl AuditConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_name(mut self, log_name: impl Into<String>) -> Self {
        self.log_name = Some(log_name.into());
        self
    }

    pub fn with_labels(mut self, labels: LabelMapping) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_metadata(mut self, enabled: bool) -> Self {
        self.log_metadata = enabled;
        self
    }

    pub fn with_max_text_length(mut self, max: usize) -> Self {
        self.max_text_length = max;
        self
    }

    pub fn excluding<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn with_translatable<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.translatable.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn with_json_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.json_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn with_additional_data(
        mut self,
        field: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        self.additional_data.insert(field.into(), label.into());
        self
    }

    pub fn with_relationship<I, S>(mut self, relation: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = fields.into_iter().map(Into::into).collect();
        self.relationships.insert(relation.into(), fields);
        self
    }

    /// Log name for records of `subject_type`.
    pub fn log_name_for(&self, subject_type: &str) -> String {
        self.log_name
            .clone()
            .unwrap_or_else(|| subject_type.to_string())
    }

    /// Declared kind of `field`.
    ///
    /// Explicit `translatable`/`json_fields` declarations win; a nested
    /// label mapping also marks the field as JSON.
    pub fn field_kind(&self, field: &str) -> FieldKind {
        if self.translatable.contains(field) {
            FieldKind::Translatable
        } else if self.json_fields.contains(field) || self.labels.nested(field).is_some() {
            FieldKind::Json
        } else {
            FieldKind::Scalar
        }
    }

    /// Tracked attributes are the mapped fields, or everything when no
    /// mapping is declared.
    pub fn log_options(&self, subject_type: &str) -> LogOptions {
        let log_only = if self.labels.is_empty() {
            vec!["*".to_string()]
        } else {
            self.labels.fields().map(str::to_string).collect()
        };

        LogOptions {
            log_only,
            log_name: self.log_name_for(subject_type),
            log_only_dirty: self.log_only_dirty,
            submit_empty_logs: false,
        }
    }
}

/// Process-wide, read-only map of subject type → audit configuration.
///
/// Unregistered types fall back to a default configuration (log every
/// attribute, no labels, no exclusions).
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: HashMap<String, Arc<AuditConfig>>,
    fallback: Arc<AuditConfig>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose unregistered types use `fallback`.
    pub fn with_fallback(fallback: AuditConfig) -> Self {
        Self {
            entities: HashMap::new(),
            fallback: Arc::new(fallback),
        }
    }

    pub fn register(&mut self, subject_type: impl Into<String>, config: AuditConfig) {
        self.entities.insert(subject_type.into(), Arc::new(config));
    }

    pub fn get(&self, subject_type: &str) -> Option<Arc<AuditConfig>> {
        self.entities.get(subject_type).cloned()
    }

    pub fn config_for(&self, subject_type: &str) -> Arc<AuditConfig> {
        self.get(subject_type)
            .unwrap_or_else(|| Arc::clone(&self.fallback))
    }

    /// Like [`get`](Self::get), but an unregistered type is an error.
    pub fn require(&self, subject_type: &str) -> Result<Arc<AuditConfig>> {
        self.get(subject_type)
            .ok_or_else(|| LoggableError::EntityNotConfigured {
                subject_type: subject_type.to_string(),
            })
    }

    pub fn is_registered(&self, subject_type: &str) -> bool {
        self.entities.contains_key(subject_type)
    }

    pub fn subject_types(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }
}
