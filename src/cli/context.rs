use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static LOGGABLE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Initialize the global loggable directory path.
/// If `custom` is provided, uses that path; otherwise defaults to `.loggable`.
pub fn init(custom: Option<&str>) {
    let dir = custom
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".loggable"));
    let _ = LOGGABLE_DIR.set(dir);
}

/// Get the current loggable directory path.
pub fn loggable_dir() -> &'static Path {
    LOGGABLE_DIR
        .get()
        .map(|p| p.as_path())
        .unwrap_or(Path::new(".loggable"))
}

/// Install the stderr diagnostics subscriber.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects debug output
/// for this crate and everything else stays at warn.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose {
        "warn,loggable=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
