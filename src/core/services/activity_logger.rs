use std::sync::Arc;

use crate::core::errors::Result;
use crate::core::models::audit_record::AuditRecord;
use crate::core::models::context::InvocationContext;
use crate::core::models::lifecycle_event::LifecycleEvent;
use crate::core::services::activity_tap::{ActivityTap, TapOutcome};
use crate::core::traits::audit_store::AuditStore;
use crate::core::traits::auditable::Auditable;
use crate::core::traits::identity::IdentityProvider;

/// Runs the tap pipeline and hands surviving records to a store.
pub struct ActivityLogger {
    tap: ActivityTap,
    store: Arc<dyn AuditStore>,
}

impl ActivityLogger {
    pub fn new(tap: ActivityTap, store: Arc<dyn AuditStore>) -> Self {
        Self { tap, store }
    }

    /// Log one lifecycle event.
    ///
    /// Returns the persisted record, or `None` when the record was
    /// discarded because nothing loggable was left.
    pub fn log(
        &self,
        subject: &dyn Auditable,
        event: LifecycleEvent,
        context: &InvocationContext,
        identity: &dyn IdentityProvider,
    ) -> Result<Option<AuditRecord>> {
        match self.tap.tap(subject, event, context, identity) {
            TapOutcome::Persist(record) => self.store.persist(record).map(Some),
            TapOutcome::Discard => Ok(None),
        }
    }

    pub fn store(&self) -> &Arc<dyn AuditStore> {
        &self.store
    }
}
