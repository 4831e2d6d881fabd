pub mod attributes;
pub mod audit_record;
pub mod context;
pub mod label_mapping;
pub mod lifecycle_event;
pub mod metadata;
