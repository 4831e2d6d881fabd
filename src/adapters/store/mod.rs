pub mod json_audit_store;
pub mod memory_audit_store;
