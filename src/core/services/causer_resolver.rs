use std::panic::{self, AssertUnwindSafe};

use crate::core::models::audit_record::{CauserRef, SubjectRef};
use crate::core::traits::identity::IdentityProvider;

/// Works out who caused a change, degrading to "nobody" instead of failing.
///
/// Logging an activity must never break the operation being logged, so
/// every failure in the identity provider (an `Err` or a panic) comes out
/// as `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CauserResolver {
    testing: bool,
}

impl CauserResolver {
    /// `testing` enables non-interactive mode: the causer is whatever the
    /// provider currently reports, skipping full resolution.
    pub fn new(testing: bool) -> Self {
        Self { testing }
    }

    pub fn resolve(
        &self,
        identity: &dyn IdentityProvider,
        subject: Option<&SubjectRef>,
    ) -> Option<CauserRef> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            if identity.is_guest() {
                return Ok(None);
            }
            if self.testing {
                return Ok(identity.current());
            }
            identity.resolve(subject)
        }));

        match outcome {
            Ok(Ok(causer)) => causer,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "causer resolution failed, logging without causer");
                None
            }
            Err(_) => {
                tracing::warn!("identity provider panicked, logging without causer");
                None
            }
        }
    }
}
