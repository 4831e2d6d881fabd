use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::config::app_config::AppConfig;
use crate::core::errors::{LoggableError, Result};
use crate::core::models::audit_record::AuditRecord;
use crate::core::traits::audit_store::{AuditStore, RecordFilter};

/// Audit store that appends records as JSON lines to a file.
///
/// Each line in the log file is a self-contained JSON object representing
/// one `AuditRecord`. Ids are assigned sequentially on persist; the highest
/// id issued is kept in a `<log_file>.seq` file next to the log, so pruning
/// never causes an id to be handed out twice.
pub struct JsonAuditStore {
    log_path: PathBuf,
    seq_path: PathBuf,
    tmp_path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonAuditStore {
    /// Create a store that writes to `{loggable_dir}/{log_file}`.
    pub fn new(loggable_dir: &Path, log_file: &str) -> Self {
        Self {
            log_path: loggable_dir.join(log_file),
            seq_path: loggable_dir.join(format!("{log_file}.seq")),
            tmp_path: loggable_dir.join(format!("{log_file}.tmp")),
            write_lock: Mutex::new(()),
        }
    }

    /// Create a store from an `AppConfig`, falling back to defaults
    /// if the `[audit]` section is missing.
    pub fn from_config(loggable_dir: &Path, config: &AppConfig) -> Self {
        Self::new(loggable_dir, config.log_file())
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    fn read_all(&self) -> Result<Vec<AuditRecord>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.log_path).map_err(|e| LoggableError::StoreError {
            detail: format!("Cannot read audit log: {e}"),
        })?;

        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| LoggableError::StoreError {
                detail: format!("Error reading audit log line {}: {e}", line_num + 1),
            })?;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let record: AuditRecord =
                serde_json::from_str(trimmed).map_err(|e| LoggableError::StoreError {
                    detail: format!("Malformed audit record at line {}: {e}", line_num + 1),
                })?;
            records.push(record);
        }

        Ok(records)
    }

    /// Replace the whole log, going through a sibling temp file so a
    /// failed write never leaves a half-written log behind.
    fn write_all(&self, records: &[AuditRecord]) -> Result<()> {
        let mut content = String::new();
        for record in records {
            content.push_str(&serde_json::to_string(record)?);
            content.push('\n');
        }

        fs::write(&self.tmp_path, content).map_err(|e| LoggableError::StoreError {
            detail: format!("Cannot write {}: {e}", self.tmp_path.display()),
        })?;
        fs::rename(&self.tmp_path, &self.log_path).map_err(|e| LoggableError::StoreError {
            detail: format!("Cannot replace audit log: {e}"),
        })?;
        Ok(())
    }

    /// Highest id issued so far.
    ///
    /// Logs written before the sequence file existed fall back to the
    /// largest id found in the log.
    fn last_id(&self) -> Result<u64> {
        if !self.seq_path.exists() {
            return Ok(max_id(&self.read_all()?));
        }

        let content = fs::read_to_string(&self.seq_path)?;
        let content = content.trim();
        content.parse().map_err(|_| LoggableError::StoreError {
            detail: format!(
                "Corrupt id sequence in {}: '{content}'",
                self.seq_path.display()
            ),
        })
    }

    fn save_last_id(&self, id: u64) -> Result<()> {
        fs::write(&self.seq_path, format!("{id}\n")).map_err(|e| LoggableError::StoreError {
            detail: format!("Cannot write {}: {e}", self.seq_path.display()),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock.lock().map_err(|_| LoggableError::StoreError {
            detail: "audit log lock poisoned".into(),
        })
    }
}

fn max_id(records: &[AuditRecord]) -> u64 {
    records.iter().filter_map(|r| r.id).max().unwrap_or(0)
}

impl AuditStore for JsonAuditStore {
    fn persist(&self, mut record: AuditRecord) -> Result<AuditRecord> {
        let _guard = self.lock()?;

        let id = self.last_id()? + 1;
        record.id = Some(id);

        let line = serde_json::to_string(&record).map_err(|e| LoggableError::StoreError {
            detail: format!("Failed to serialize audit record: {e}"),
        })?;

        // Ensure the parent directory exists
        if let Some(parent) = self.log_path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        // Claim the id before writing; a failed append only skips it.
        self.save_last_id(id)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| LoggableError::StoreError {
                detail: format!("Cannot open audit log at {}: {e}", self.log_path.display()),
            })?;

        writeln!(file, "{line}").map_err(|e| LoggableError::StoreError {
            detail: format!("Failed to write audit record: {e}"),
        })?;

        Ok(record)
    }

    fn query(&self, filter: &RecordFilter) -> Result<Vec<AuditRecord>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|record| filter.matches(record))
            .collect())
    }

    fn prune(&self, cutoff: DateTime<Utc>, limit: usize) -> Result<usize> {
        let _guard = self.lock()?;

        let records = self.read_all()?;
        if !self.seq_path.exists() && !records.is_empty() {
            self.save_last_id(max_id(&records))?;
        }

        let mut removed = 0;
        let kept: Vec<AuditRecord> = records
            .into_iter()
            .filter(|record| {
                let expired = record.created_at < cutoff && removed < limit;
                if expired {
                    removed += 1;
                }
                !expired
            })
            .collect();

        if removed > 0 {
            self.write_all(&kept)?;
        }
        Ok(removed)
    }
}
