//! Run configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a user file only needs the keys it wants to override.
//!
//! ## Config File Location
//!
//! By default the file is looked up next to the input roster:
//!
//! ```text
//! rosters/
//! ├── config.toml          # Applies to every roster in this directory
//! ├── march.csv
//! └── april.xlsx
//! ```
//!
//! `--config <FILE>` points at an explicit file instead.
//!
//! ## Configuration Options
//!
//! ```toml
//! [source]
//! csv_delimiter = ";"     # Field separator of CSV exports
//! csv_quote = "\""        # Quote character of CSV exports
//! header_rows = 0         # Leading rows to drop before mapping
//! list_separator = ","    # Separator inside the substitutes and flags cells
//!
//! [integrity]
//! on_approver_conflict = "warn"   # "warn" (first row wins) or "reject"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Name of the config file looked up next to the input roster.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RosterConfig {
    /// How raw rows are read and mapped.
    pub source: SourceConfig,
    /// What to do with groups whose rows disagree.
    pub integrity: IntegrityConfig,
}

impl RosterConfig {
    /// Validate that every separator is usable by the CSV reader.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let src = &self.source;
        single_ascii("source.csv_delimiter", &src.csv_delimiter)?;
        single_ascii("source.csv_quote", &src.csv_quote)?;
        single_ascii("source.list_separator", &src.list_separator)?;
        if src.csv_delimiter == src.csv_quote {
            return Err(ConfigError::Validation(
                "source.csv_delimiter and source.csv_quote must differ".into(),
            ));
        }
        Ok(())
    }
}

fn single_ascii(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.len() == 1 && value.is_ascii() {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "{key} must be a single ASCII character, got {value:?}"
        )))
    }
}

/// Row source settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub csv_delimiter: String,
    pub csv_quote: String,
    /// Number of leading rows (titles, column headers) to discard.
    pub header_rows: usize,
    /// Separator between items of the substitutes and flags cells.
    pub list_separator: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            csv_delimiter: ";".to_string(),
            csv_quote: "\"".to_string(),
            header_rows: 0,
            list_separator: ",".to_string(),
        }
    }
}

impl SourceConfig {
    pub fn delimiter_byte(&self) -> u8 {
        self.csv_delimiter.as_bytes().first().copied().unwrap_or(b';')
    }

    pub fn quote_byte(&self) -> u8 {
        self.csv_quote.as_bytes().first().copied().unwrap_or(b'"')
    }

    pub fn list_char(&self) -> char {
        self.list_separator.chars().next().unwrap_or(',')
    }
}

/// Group integrity settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntegrityConfig {
    pub on_approver_conflict: ConflictPolicy,
}

/// Handling of groups whose rows disagree on approver, sector or shift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Log every disagreement and render with the first row's values.
    #[default]
    Warn,
    /// Skip rendering the group; its rows still reach the audit log.
    Reject,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(RosterConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value; `Ok(None)` if it does not exist.
pub fn load_raw_config(config_path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<RosterConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: RosterConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config that applies to `input`.
///
/// An explicit path must exist. Without one, `config.toml` next to the input
/// is used when present and stock defaults otherwise.
pub fn load_config(input: &Path, explicit: Option<&Path>) -> Result<RosterConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = match explicit {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(toml::from_str(&content)?)
        }
        None => {
            let dir = input.parent().unwrap_or_else(|| Path::new("."));
            load_raw_config(&dir.join(CONFIG_FILE_NAME))?
        }
    };
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# roster-sheets configuration
# ===========================
# All settings are optional. Values shown below are the defaults.
# Place this file next to the roster as config.toml, or pass --config.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Row source
# ---------------------------------------------------------------------------
[source]
# Field separator and quote character of CSV exports.
csv_delimiter = ";"
csv_quote = "\""

# Leading rows (titles, column headers) dropped before rows are mapped.
header_rows = 0

# Separator between items of the substitutes and flags cells.
list_separator = ","

# ---------------------------------------------------------------------------
# Group integrity
# ---------------------------------------------------------------------------
[integrity]
# Rows of one sheet that disagree on approver, sector or shift:
#   "warn"   log the disagreement and render with the first row's values
#   "reject" skip the sheet (its rows still appear in dumplist.txt)
on_approver_conflict = "warn"
"##
}
