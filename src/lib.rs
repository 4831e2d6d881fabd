//! Activity-log enrichment: turns raw before/after attribute snapshots
//! into labelled, size-bounded audit records with optional request
//! metadata and a causer that never fails to resolve.

pub mod adapters;
pub mod config;
pub mod core;
