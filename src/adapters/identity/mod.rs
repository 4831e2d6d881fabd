pub mod static_identity;
