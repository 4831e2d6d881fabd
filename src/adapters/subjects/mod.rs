pub mod declared_subject;
pub mod event_file;
