pub mod audit_store;
pub mod auditable;
pub mod identity;
