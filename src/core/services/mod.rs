pub mod activity_logger;
pub mod activity_tap;
pub mod attribute_filter;
pub mod attribute_mapper;
pub mod causer_resolver;
pub mod change_tracker;
pub mod metadata_enricher;
pub mod size_limiter;
