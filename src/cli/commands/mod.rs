pub mod init;
pub mod log;
pub mod prune;
pub mod status;
pub mod tap;
