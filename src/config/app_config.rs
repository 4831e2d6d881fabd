use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use crate::config::entity_config::{AuditConfig, DEFAULT_MAX_TEXT_LENGTH, EntityRegistry};
use crate::core::errors::{LoggableError, Result};
use crate::core::models::label_mapping::LabelMapping;

/// Top-level Loggable configuration read from `.loggable/config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub loggable: LoggableSection,
    #[serde(default)]
    pub defaults: DefaultsSection,
    #[serde(default)]
    pub metadata: MetadataSection,
    #[serde(default)]
    pub cleanup: CleanupSection,
    pub audit: Option<AuditSection>,
    #[serde(default)]
    pub entities: HashMap<String, EntitySection>,
}

impl AppConfig {
    /// Load the configuration from `{loggable_dir}/config.toml`.
    ///
    /// After parsing, applies `LOGGABLE_*` environment overrides and
    /// validates the audit log filename.
    pub fn load(loggable_dir: &Path) -> Result<Self> {
        let config_path = loggable_dir.join("config.toml");
        if !config_path.exists() {
            return Err(LoggableError::InvalidConfig {
                detail: "config.toml not found. Run 'loggable init' first.".into(),
            });
        }
        let content = std::fs::read_to_string(&config_path)?;
        let mut config = Self::parse(&content)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| LoggableError::InvalidConfig {
            detail: format!("Failed to parse config.toml: {e}"),
        })?;

        if config.loggable.format_version > CURRENT_FORMAT_VERSION {
            return Err(LoggableError::FormatVersionTooNew {
                project_version: config.loggable.format_version,
                supported_version: CURRENT_FORMAT_VERSION,
            });
        }

        if let Some(audit) = &config.audit {
            validate_simple_filename(&audit.log_file, "audit log file")?;
        }

        Ok(config)
    }

    /// Override settings from `LOGGABLE_*` variables looked up through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("LOGGABLE_MAX_TEXT_LENGTH") {
            self.defaults.max_text_length = parse_env("LOGGABLE_MAX_TEXT_LENGTH", &v)?;
        }
        if let Some(v) = lookup("LOGGABLE_LOG_METADATA") {
            self.defaults.log_metadata = parse_env_bool("LOGGABLE_LOG_METADATA", &v)?;
        }
        if let Some(v) = lookup("LOGGABLE_LOG_ONLY_DIRTY") {
            self.defaults.log_only_dirty = parse_env_bool("LOGGABLE_LOG_ONLY_DIRTY", &v)?;
        }
        if let Some(v) = lookup("LOGGABLE_CLEANUP_ENABLED") {
            self.cleanup.enabled = parse_env_bool("LOGGABLE_CLEANUP_ENABLED", &v)?;
        }
        if let Some(v) = lookup("LOGGABLE_CLEANUP_OLDER_THAN") {
            self.cleanup.older_than_days = parse_env("LOGGABLE_CLEANUP_OLDER_THAN", &v)?;
        }
        if let Some(v) = lookup("LOGGABLE_CLEANUP_BATCH_SIZE") {
            self.cleanup.batch_size = parse_env("LOGGABLE_CLEANUP_BATCH_SIZE", &v)?;
        }
        Ok(())
    }

    /// Resolve every `[entities.*]` section against `[defaults]`.
    pub fn registry(&self) -> EntityRegistry {
        let mut registry = EntityRegistry::with_fallback(self.defaults.audit_config());
        for (subject_type, section) in &self.entities {
            registry.register(subject_type.clone(), section.resolve(&self.defaults));
        }
        registry
    }

    pub fn audit_enabled(&self) -> bool {
        self.audit.as_ref().map(|a| a.enabled).unwrap_or(true)
    }

    pub fn log_file(&self) -> &str {
        self.audit
            .as_ref()
            .map(|a| a.log_file.as_str())
            .unwrap_or(DEFAULT_LOG_FILE)
    }
}

/// Current format version supported by this build of Loggable.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

pub const DEFAULT_LOG_FILE: &str = "audit.log";

/// The `[loggable]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggableSection {
    #[serde(default = "default_version")]
    pub version: String,
    /// Format version for backward compatibility. Defaults to 1 if missing.
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    /// Non-interactive mode: the causer is whatever the identity provider
    /// currently reports, without going through full resolution.
    #[serde(default)]
    pub testing: bool,
}

impl Default for LoggableSection {
    fn default() -> Self {
        Self {
            version: default_version(),
            format_version: default_format_version(),
            testing: false,
        }
    }
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_format_version() -> u32 {
    1
}

/// The `[defaults]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultsSection {
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,
    #[serde(default)]
    pub log_metadata: bool,
    #[serde(default = "default_true")]
    pub log_only_dirty: bool,
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
            log_metadata: false,
            log_only_dirty: true,
        }
    }
}

impl DefaultsSection {
    /// Configuration used for subject types without an `[entities.*]` entry.
    pub fn audit_config(&self) -> AuditConfig {
        AuditConfig {
            log_metadata: self.log_metadata,
            log_only_dirty: self.log_only_dirty,
            max_text_length: self.max_text_length,
            ..AuditConfig::default()
        }
    }
}

fn default_max_text_length() -> usize {
    DEFAULT_MAX_TEXT_LENGTH
}

fn default_true() -> bool {
    true
}

/// The `[metadata]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataSection {
    #[serde(default)]
    pub collect: CollectSection,
}

/// `[metadata.collect]`: which request details go into `device_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CollectSection {
    #[serde(default = "default_true")]
    pub ip_address: bool,
    #[serde(default = "default_true")]
    pub user_agent: bool,
    #[serde(default)]
    pub session_id: bool,
    #[serde(default)]
    pub request_url: bool,
}

impl Default for CollectSection {
    fn default() -> Self {
        Self {
            ip_address: true,
            user_agent: true,
            session_id: false,
            request_url: false,
        }
    }
}

/// The `[cleanup]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CleanupSection {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_older_than_days")]
    pub older_than_days: u32,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for CleanupSection {
    fn default() -> Self {
        Self {
            enabled: false,
            older_than_days: default_older_than_days(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_older_than_days() -> u32 {
    90
}

fn default_batch_size() -> usize {
    1000
}

/// The `[audit]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditSection {
    pub enabled: bool,
    pub log_file: String,
}

/// An `[entities.<SubjectType>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntitySection {
    pub log_name: Option<String>,
    pub log_metadata: Option<bool>,
    pub max_text_length: Option<usize>,
    #[serde(default)]
    pub attributes: LabelMapping,
    #[serde(default)]
    pub exclude: BTreeSet<String>,
    #[serde(default)]
    pub translatable: BTreeSet<String>,
    #[serde(default)]
    pub json_fields: BTreeSet<String>,
    #[serde(default)]
    pub additional_data: BTreeMap<String, String>,
    #[serde(default)]
    pub relationships: BTreeMap<String, Vec<String>>,
}

impl EntitySection {
    /// Fill unset values from `[defaults]`.
    pub fn resolve(&self, defaults: &DefaultsSection) -> AuditConfig {
        AuditConfig {
            log_name: self.log_name.clone(),
            log_metadata: self.log_metadata.unwrap_or(defaults.log_metadata),
            log_only_dirty: defaults.log_only_dirty,
            max_text_length: self.max_text_length.unwrap_or(defaults.max_text_length),
            labels: self.attributes.clone(),
            exclude: self.exclude.clone(),
            translatable: self.translatable.clone(),
            json_fields: self.json_fields.clone(),
            additional_data: self.additional_data.clone(),
            relationships: self.relationships.clone(),
        }
    }
}

/// Reject file names that could escape the `.loggable/` directory.
pub fn validate_simple_filename(name: &str, what: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\');
    if invalid {
        return Err(LoggableError::InvalidConfig {
            detail: format!("Invalid {what} '{name}': must be a plain file name"),
        });
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| LoggableError::InvalidConfig {
            detail: format!("{key} has an invalid value: '{value}'"),
        })
}

fn parse_env_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(LoggableError::InvalidConfig {
            detail: format!("{key} has an invalid value: '{value}'"),
        }),
    }
}
