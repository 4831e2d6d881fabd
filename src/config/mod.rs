pub mod app_config;
pub mod entity_config;
