use std::io::Read;
use std::path::Path;

use colored::Colorize;

use crate::cli::output;
use loggable::adapters::identity::static_identity::StaticIdentity;
use loggable::adapters::store::json_audit_store::JsonAuditStore;
use loggable::adapters::subjects::event_file::EventFile;
use loggable::config::app_config::AppConfig;
use loggable::core::errors::{LoggableError, Result};
use loggable::core::models::audit_record::AuditRecord;
use loggable::core::services::activity_tap::{ActivityTap, TapOutcome};
use loggable::core::services::causer_resolver::CauserResolver;
use loggable::core::services::metadata_enricher::MetadataEnricher;
use loggable::core::traits::audit_store::AuditStore;

/// Flags of `loggable tap`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TapOptions {
    pub dry_run: bool,
    pub testing: bool,
    pub strict: bool,
    pub json: bool,
}

/// Execute the `loggable tap` command.
///
/// Runs one event file through the pipeline, prints the resulting record
/// and appends it to the activity log.
pub fn execute(
    loggable_dir: &Path,
    file: &str,
    causer: Option<&str>,
    options: TapOptions,
) -> Result<()> {
    let config = AppConfig::load(loggable_dir)?;
    let registry = config.registry();

    let event_file = EventFile::parse(&read_input(file)?)?;
    let entity = if options.strict {
        registry.require(&event_file.subject_type)?
    } else {
        registry.config_for(&event_file.subject_type)
    };

    let identity = match causer {
        Some(value) => StaticIdentity::parse(value).ok_or_else(|| LoggableError::InvalidEvent {
            detail: format!("--causer must look like Type:id, got '{value}'"),
        })?,
        None => event_file.identity(),
    };

    let subject = event_file.declared_subject(entity.clone())?;
    let event = event_file.lifecycle_event(&entity)?;
    let tap = ActivityTap::new(
        MetadataEnricher::new(config.metadata.collect),
        CauserResolver::new(options.testing || config.loggable.testing),
    );

    let context = event_file.invocation_context();
    let outcome = tap.tap(&subject, event, &context, &identity);

    let record = match outcome {
        TapOutcome::Persist(record) => record,
        TapOutcome::Discard => {
            if !options.json {
                output::warning("Nothing to log: every change was excluded or empty");
            }
            return Ok(());
        }
    };

    if options.dry_run || !config.audit_enabled() {
        print_record(&record, options.json)?;
        if !options.json {
            let reason = if options.dry_run {
                "dry run"
            } else {
                "[audit] is disabled"
            };
            output::warning(&format!("Not written ({reason})"));
        }
        return Ok(());
    }

    let store = JsonAuditStore::from_config(loggable_dir, &config);
    match store.persist(record.clone()) {
        Ok(saved) => {
            print_record(&saved, options.json)?;
            if !options.json {
                output::success(&format!("Recorded in {}", store.path().display()));
            }
        }
        Err(e) => {
            // The event itself is still valid; only the write failed.
            tracing::warn!(error = %e, "failed to write activity record");
            print_record(&record, options.json)?;
            output::warning(&format!("Record not saved: {e}"));
        }
    }

    Ok(())
}

/// Read the event file, or stdin for `-`.
fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        return Ok(content);
    }

    let path = Path::new(file);
    if !path.exists() {
        return Err(LoggableError::InvalidEvent {
            detail: format!("event file not found: {file}"),
        });
    }
    Ok(std::fs::read_to_string(path)?)
}

fn print_record(record: &AuditRecord, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(record)?);
        return Ok(());
    }

    output::header(&record.description);
    output::field("log", &record.log_name);
    output::field("event", &record.event.to_string().cyan().to_string());
    output::field("subject", &record.subject().to_string());
    output::field(
        "causer",
        &record
            .causer()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".dimmed().to_string()),
    );
    if let Some(batch) = record.batch_uuid {
        output::field("batch", &batch.to_string());
    }
    println!();
    println!("{}", serde_json::to_string_pretty(&record.properties)?);
    Ok(())
}
