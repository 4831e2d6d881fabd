use chrono::{DateTime, Utc};

use crate::core::errors::Result;
use crate::core::models::audit_record::AuditRecord;

/// Filters for [`AuditStore::query`]. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub log_name: Option<String>,
    pub subject_type: Option<String>,
    pub subject_id: Option<String>,
    pub causer_id: Option<String>,
    pub since: Option<DateTime<Utc>>,
}

impl RecordFilter {
    pub fn matches(&self, record: &AuditRecord) -> bool {
        let eq = |want: &Option<String>, have: Option<&str>| {
            want.as_deref().is_none_or(|w| have == Some(w))
        };

        eq(&self.log_name, Some(record.log_name.as_str()))
            && eq(&self.subject_type, Some(record.subject_type.as_str()))
            && eq(&self.subject_id, Some(record.subject_id.as_str()))
            && eq(&self.causer_id, record.causer_id.as_deref())
            && self.since.is_none_or(|since| record.created_at >= since)
    }
}

/// Port for persisting and reading audit records.
pub trait AuditStore: Send + Sync {
    /// Persist `record`, returning it with its assigned id.
    fn persist(&self, record: AuditRecord) -> Result<AuditRecord>;

    /// All records matching `filter`, oldest first.
    fn query(&self, filter: &RecordFilter) -> Result<Vec<AuditRecord>>;

    /// Delete records created before `cutoff`, at most `batch_size` at a
    /// time. Returns how many were removed.
    fn prune(&self, cutoff: DateTime<Utc>, batch_size: usize) -> Result<usize>;
}
