use std::path::Path;

use chrono::{NaiveDate, TimeZone, Utc};
use colored::Colorize;

use crate::cli::output;
use loggable::adapters::store::json_audit_store::JsonAuditStore;
use loggable::config::app_config::AppConfig;
use loggable::core::errors::{LoggableError, Result};
use loggable::core::models::audit_record::{AuditEvent, AuditRecord};
use loggable::core::traits::audit_store::{AuditStore, RecordFilter};

/// Filters of `loggable log`.
#[derive(Debug, Clone, Default)]
pub struct LogQuery<'a> {
    pub log_name: Option<&'a str>,
    pub subject: Option<&'a str>,
    pub causer: Option<&'a str>,
    pub since: Option<&'a str>,
    pub last: Option<usize>,
    pub json: bool,
}

impl LogQuery<'_> {
    fn has_filters(&self) -> bool {
        self.log_name.is_some()
            || self.subject.is_some()
            || self.causer.is_some()
            || self.since.is_some()
    }

    fn record_filter(&self) -> Result<RecordFilter> {
        let (subject_type, subject_id) = match self.subject {
            Some(subject) => match subject.split_once(':') {
                Some((t, id)) => (Some(t.to_string()), Some(id.to_string())),
                None => (Some(subject.to_string()), None),
            },
            None => (None, None),
        };

        Ok(RecordFilter {
            log_name: self.log_name.map(str::to_string),
            subject_type,
            subject_id,
            causer_id: self.causer.map(str::to_string),
            since: self.since.map(parse_since).transpose()?,
        })
    }
}

/// Execute the `loggable log` command.
///
/// Displays recorded activity with optional filters for log name,
/// subject, causer, date and entry count.
pub fn execute(loggable_dir: &Path, query: &LogQuery<'_>) -> Result<()> {
    let config = AppConfig::load(loggable_dir)?;
    let store = JsonAuditStore::from_config(loggable_dir, &config);

    let records = store.query(&query.record_filter()?)?;

    // Apply --last N (take from the end)
    let skip = query
        .last
        .map(|n| records.len().saturating_sub(n))
        .unwrap_or(0);
    let display = &records[skip..];

    if query.json {
        for record in display {
            println!("{}", serde_json::to_string(record)?);
        }
        return Ok(());
    }

    if display.is_empty() {
        output::header("loggable log");
        output::warning("No activity recorded");
        if query.has_filters() {
            println!("  Try removing filters to see all entries.");
        }
        return Ok(());
    }

    output::header(&format!("loggable log ({} entries)", display.len()));
    println!();

    for record in display {
        print_record(record);
    }

    Ok(())
}

/// Parse a date string (ISO 8601: `YYYY-MM-DD`) into a UTC DateTime.
fn parse_since(s: &str) -> Result<chrono::DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| LoggableError::InvalidConfig {
        detail: format!(
            "Invalid date format: '{s}'. Expected ISO 8601 (YYYY-MM-DD), e.g. 2026-01-15"
        ),
    })?;
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    Ok(Utc.from_utc_datetime(&midnight))
}

/// Print a single record as a formatted row.
fn print_record(record: &AuditRecord) {
    let date = record.created_at.format("%Y-%m-%d %H:%M:%S");
    let causer = record
        .causer()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".to_string());
    let fields: Vec<&str> = record
        .properties
        .attributes
        .keys()
        .chain(record.properties.old.keys())
        .map(String::as_str)
        .fold(Vec::new(), |mut acc, key| {
            if !acc.contains(&key) {
                acc.push(key);
            }
            acc
        });

    println!(
        "  {} {} {:<10} {} {} {}",
        date.to_string().dimmed(),
        "│".dimmed(),
        format_event(&record.event),
        record.subject(),
        format!("by {causer}").dimmed(),
        fields.join(", "),
    );
}

/// Format an AuditEvent as a colored string.
fn format_event(event: &AuditEvent) -> String {
    match event {
        AuditEvent::Created => "created".green().to_string(),
        AuditEvent::Updated => "updated".yellow().to_string(),
        AuditEvent::Deleted => "deleted".red().to_string(),
        AuditEvent::Restored => "restored".cyan().to_string(),
        AuditEvent::Custom(name) => name.blue().to_string(),
    }
}
