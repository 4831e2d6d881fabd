use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::core::errors::{LoggableError, Result};
use crate::core::models::audit_record::AuditRecord;
use crate::core::traits::audit_store::{AuditStore, RecordFilter};

/// In-process audit store, for embedding hosts and tests.
#[derive(Default)]
pub struct MemoryAuditStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    records: Vec<AuditRecord>,
    /// Highest id ever issued; pruning never lowers it.
    last_id: u64,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.state().map(|s| s.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn state(&self) -> Result<MutexGuard<'_, State>> {
        self.state.lock().map_err(|_| LoggableError::StoreError {
            detail: "in-memory store lock poisoned".into(),
        })
    }
}

impl AuditStore for MemoryAuditStore {
    fn persist(&self, mut record: AuditRecord) -> Result<AuditRecord> {
        let mut state = self.state()?;
        state.last_id += 1;
        record.id = Some(state.last_id);
        state.records.push(record.clone());
        Ok(record)
    }

    fn query(&self, filter: &RecordFilter) -> Result<Vec<AuditRecord>> {
        Ok(self
            .state()?
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    fn prune(&self, cutoff: DateTime<Utc>, limit: usize) -> Result<usize> {
        let mut state = self.state()?;
        let mut removed = 0;
        state.records.retain(|r| {
            let expired = r.created_at < cutoff && removed < limit;
            if expired {
                removed += 1;
            }
            !expired
        });
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::audit_record::{AuditEvent, SubjectRef};
    use chrono::Duration;
    use std::sync::Arc;

    fn record(id: &str) -> AuditRecord {
        AuditRecord::new(
            "Product",
            "Created new Product",
            AuditEvent::Created,
            &SubjectRef::new("Product", id),
        )
    }

    fn expired(id: &str) -> AuditRecord {
        let mut record = record(id);
        record.created_at = Utc::now() - Duration::days(400);
        record
    }

    #[test]
    fn persists_with_ids() {
        let store = MemoryAuditStore::new();
        assert!(store.is_empty());

        assert_eq!(store.persist(record("1")).unwrap().id, Some(1));
        assert_eq!(store.persist(record("2")).unwrap().id, Some(2));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn prune_respects_cutoff() {
        let store = MemoryAuditStore::new();
        store.persist(expired("1")).unwrap();
        store.persist(record("2")).unwrap();

        let removed = store.prune(Utc::now() - Duration::days(365), 100).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(
            store.query(&RecordFilter::default()).unwrap()[0].subject_id,
            "2"
        );
    }

    #[test]
    fn ids_are_not_reused_after_pruning_everything() {
        let store = MemoryAuditStore::new();
        store.persist(expired("1")).unwrap();
        store.persist(expired("2")).unwrap();

        let removed = store.prune(Utc::now() - Duration::days(365), 100).unwrap();
        assert_eq!(removed, 2);
        assert!(store.is_empty());

        assert_eq!(store.persist(record("3")).unwrap().id, Some(3));
    }

    #[test]
    fn concurrent_persists_get_unique_ids() {
        let store = Arc::new(MemoryAuditStore::new());
        std::thread::scope(|scope| {
            for i in 0..8 {
                let store = Arc::clone(&store);
                scope.spawn(move || {
                    store.persist(record(&i.to_string())).unwrap();
                });
            }
        });

        let mut ids: Vec<_> = store
            .query(&RecordFilter::default())
            .unwrap()
            .into_iter()
            .filter_map(|r| r.id)
            .collect();
        ids.sort();
        assert_eq!(ids, (1..=8).collect::<Vec<u64>>());
    }
}
