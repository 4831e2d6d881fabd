/// All domain errors for Loggable.
///
/// Each variant provides enough context to diagnose the issue
/// without needing a debugger.
#[derive(Debug, thiserror::Error)]
pub enum LoggableError {
    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error(
        "No audit configuration registered for '{subject_type}'\n\n  \
         Add an [entities.{subject_type}] section to .loggable/config.toml\n  \
         or register the type with EntityRegistry::register."
    )]
    EntityNotConfigured { subject_type: String },

    #[error(
        "Invalid event: {detail}\n\n  \
         An event file needs at least 'event', 'subject_type' and 'subject_id',\n  \
         plus either 'old'/'attributes' or 'before'/'after' snapshots."
    )]
    InvalidEvent { detail: String },

    #[error("Identity resolution failed: {detail}")]
    IdentityResolution { detail: String },

    #[error("Audit store error: {detail}")]
    StoreError { detail: String },

    #[error(
        "Cleanup is disabled\n\n  \
         Enable it in .loggable/config.toml:\n    \
         [cleanup]\n    \
         enabled = true\n  \
         or pass --force to prune anyway."
    )]
    CleanupDisabled,

    #[error(
        "This project uses format version {project_version}, but your Loggable \
         only supports up to version {supported_version}.\n\n  \
         Solutions:\n    \
         → Upgrade Loggable: cargo install loggable --force"
    )]
    FormatVersionTooNew {
        project_version: u32,
        supported_version: u32,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LoggableError>;
