use std::path::Path;

use chrono::{Duration, Utc};

use crate::cli::output;
use loggable::adapters::store::json_audit_store::JsonAuditStore;
use loggable::config::app_config::AppConfig;
use loggable::core::errors::{LoggableError, Result};
use loggable::core::traits::audit_store::AuditStore;

/// Execute the `loggable prune` command.
///
/// Deletes records older than `older_than` days (or `[cleanup]`'s
/// `older_than_days`), `batch_size` records at a time.
pub fn execute(loggable_dir: &Path, older_than: Option<u32>, force: bool) -> Result<()> {
    let config = AppConfig::load(loggable_dir)?;
    if !config.cleanup.enabled && !force {
        return Err(LoggableError::CleanupDisabled);
    }

    let days = older_than.unwrap_or(config.cleanup.older_than_days);
    let cutoff = Utc::now() - Duration::days(i64::from(days));
    let store = JsonAuditStore::from_config(loggable_dir, &config);

    output::header(&format!("loggable prune (older than {days} days)"));

    let removed = prune_all(&store, cutoff, config.cleanup.batch_size)?;
    if removed == 0 {
        output::success("Nothing to prune");
    } else {
        output::success(&format!("Removed {removed} record(s)"));
    }
    Ok(())
}

/// Prune in batches until a batch comes back short.
fn prune_all(
    store: &dyn AuditStore,
    cutoff: chrono::DateTime<Utc>,
    batch_size: usize,
) -> Result<usize> {
    if batch_size == 0 {
        return Err(LoggableError::InvalidConfig {
            detail: "[cleanup] batch_size must be at least 1".into(),
        });
    }

    let mut total = 0;
    loop {
        let removed = store.prune(cutoff, batch_size)?;
        total += removed;
        tracing::debug!(removed, total, "pruned batch");
        if removed < batch_size {
            return Ok(total);
        }
    }
}
