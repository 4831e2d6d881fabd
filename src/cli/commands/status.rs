use std::path::Path;

use colored::Colorize;

use crate::cli::output;
use loggable::adapters::store::json_audit_store::JsonAuditStore;
use loggable::config::app_config::AppConfig;
use loggable::core::errors::Result;
use loggable::core::traits::audit_store::{AuditStore, RecordFilter};

/// Execute the `loggable status` command.
///
/// Displays the project configuration, the configured entities and the
/// state of the activity log.
pub fn execute(loggable_dir: &Path) -> Result<()> {
    let config = AppConfig::load(loggable_dir)?;

    output::header(&format!("Loggable v{}", env!("CARGO_PKG_VERSION")));
    let config_path = loggable_dir.join("config.toml");
    output::field("config", &config_path.display().to_string());
    output::field("max text", &config.defaults.max_text_length.to_string());
    output::field("metadata", on_off(config.defaults.log_metadata));
    output::field("testing", on_off(config.loggable.testing));

    print_entities(&config);
    print_log_status(&config, loggable_dir);
    print_cleanup(&config);

    Ok(())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

fn print_entities(config: &AppConfig) {
    println!("\n{}", "  Entities".bold());

    let registry = config.registry();
    let mut types: Vec<&str> = registry.subject_types().collect();
    if types.is_empty() {
        output::warning(
            "No [entities] configured; every type logs all attributes unlabelled",
        );
        return;
    }
    types.sort_unstable();

    for subject_type in types {
        let entity = registry.config_for(subject_type);
        let metadata = entity.log_metadata.then_some(", metadata");
        println!(
            "    {} {} {}",
            subject_type.cyan(),
            format!("→ {}", entity.log_name_for(subject_type)).dimmed(),
            format!(
                "({} labels, {} excluded{})",
                entity.labels.fields().count(),
                entity.exclude.len(),
                metadata.unwrap_or_default()
            )
            .dimmed(),
        );
    }
}

fn print_log_status(config: &AppConfig, loggable_dir: &Path) {
    println!("\n{}", "  Activity log".bold());

    if !config.audit_enabled() {
        output::warning("Disabled in config.toml");
        return;
    }

    let store = JsonAuditStore::from_config(loggable_dir, config);
    match store.query(&RecordFilter::default()) {
        Ok(records) if records.is_empty() => {
            output::success(&format!("{} (empty)", store.path().display()));
        }
        Ok(records) => {
            let last = records
                .last()
                .map(|r| r.created_at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            output::success(&format!(
                "{} ({} records, last {last})",
                store.path().display(),
                records.len()
            ));
        }
        Err(e) => output::warning(&format!("Cannot read {}: {e}", store.path().display())),
    }
}

fn print_cleanup(config: &AppConfig) {
    println!("\n{}", "  Cleanup".bold());
    if config.cleanup.enabled {
        output::success(&format!(
            "Records older than {} days can be pruned (batches of {})",
            config.cleanup.older_than_days, config.cleanup.batch_size
        ));
    } else {
        output::warning("Disabled; run 'loggable prune --force' to prune anyway");
    }
}
