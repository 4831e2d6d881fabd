use crate::core::errors::Result;
use crate::core::models::audit_record::{CauserRef, SubjectRef};

/// Port to whatever knows who is acting right now (session, token, job
/// context...).
pub trait IdentityProvider: Send + Sync {
    /// True when nobody is authenticated.
    fn is_guest(&self) -> bool;

    /// The currently authenticated identity, if any.
    fn current(&self) -> Option<CauserRef>;

    /// Full resolution of the causer for a change to `subject`.
    ///
    /// May fail (lookup errors, misconfigured guards...). Callers go through
    /// `CauserResolver`, which never lets that failure escape.
    fn resolve(&self, subject: Option<&SubjectRef>) -> Result<Option<CauserRef>>;
}
