use crate::core::errors::Result;
use crate::core::models::audit_record::{CauserRef, SubjectRef};
use crate::core::traits::identity::IdentityProvider;

/// Identity fixed up front: the `--causer` of a CLI run, a job's service
/// account, or nobody at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticIdentity {
    causer: Option<CauserRef>,
}

impl StaticIdentity {
    pub fn new(causer: CauserRef) -> Self {
        Self {
            causer: Some(causer),
        }
    }

    pub fn guest() -> Self {
        Self::default()
    }

    /// Parse `Type:id` (e.g. `User:42`).
    pub fn parse(value: &str) -> Option<Self> {
        let (causer_type, id) = value.split_once(':')?;
        let (causer_type, id) = (causer_type.trim(), id.trim());
        if causer_type.is_empty() || id.is_empty() {
            return None;
        }
        Some(Self::new(CauserRef::new(causer_type, id)))
    }
}

impl IdentityProvider for StaticIdentity {
    fn is_guest(&self) -> bool {
        self.causer.is_none()
    }

    fn current(&self) -> Option<CauserRef> {
        self.causer.clone()
    }

    fn resolve(&self, _subject: Option<&SubjectRef>) -> Result<Option<CauserRef>> {
        Ok(self.causer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_type_and_id() {
        let identity = StaticIdentity::parse("User:42").unwrap();
        assert_eq!(identity.current(), Some(CauserRef::new("User", "42")));
        assert!(!identity.is_guest());
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(StaticIdentity::parse("User").is_none());
        assert!(StaticIdentity::parse(":42").is_none());
        assert!(StaticIdentity::parse("User:").is_none());
    }

    #[test]
    fn guest_has_no_causer() {
        let guest = StaticIdentity::guest();
        assert!(guest.is_guest());
        assert_eq!(guest.resolve(None).unwrap(), None);
    }
}
