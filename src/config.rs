//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. the path given with `--config`
//! 2. `$ORDER_EXTRACT_CONFIG` (environment variable)
//! 3. `~/.config/order-extract/config.toml` (Linux), or the platform
//!    config directory elsewhere
//! 4. Built-in defaults

use crate::error::{ExtractError, Result};
use crate::export::CsvOptions;
use crate::filter::MessageFilter;
use crate::scanner::DEFAULT_MAX_TOKENS;
use crate::template::{DEFAULT_TEMPLATE, Template, TemplateSet};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "ORDER_EXTRACT_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub search: SearchConfig,
    pub export: ExportConfig,
    pub scan: ScanConfig,
    /// Extra template descriptors
    pub templates: Vec<Template>,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// `strftime` format for the received date column.
    pub date_format: String,
    /// Template used when none is given on the command line.
    pub template: String,
}

/// Message selection. `query` is parsed first; the individual keys
/// override its terms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub query: Option<String>,
    pub label: Option<String>,
    /// `YYYY-MM-DD`
    pub after: Option<String>,
    /// `YYYY-MM-DD`
    pub before: Option<String>,
}

/// Export defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output file; defaults to `items_<after>_<before>.csv`.
    pub output: Option<PathBuf>,
    pub include_message_ids: bool,
    pub bom: bool,
}

/// Scanner limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Tokens read per message before the scan is abandoned.
    pub max_tokens: usize,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            date_format: "%Y/%m/%d".to_string(),
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output: None,
            include_message_ids: true,
            bom: false,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

// ── Derived settings ────────────────────────────────────────────

impl Config {
    /// Parse TOML text and check the values the run depends on.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| ExtractError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_date_format(&self.general.date_format)?;
        if self.scan.max_tokens == 0 {
            return Err(ExtractError::Config("scan.max_tokens must be positive".into()));
        }
        self.filter()?;
        self.template_set()?;
        Ok(())
    }

    /// Built-in templates plus `[[templates]]`
    pub fn template_set(&self) -> Result<TemplateSet> {
        TemplateSet::new(self.templates.iter().cloned())
    }

    /// Filter described by the `[search]` section
    pub fn filter(&self) -> Result<MessageFilter> {
        let base = match &self.search.query {
            Some(query) => MessageFilter::parse(query)?,
            None => MessageFilter::default(),
        };
        base.with_overrides(
            self.search.label.as_deref(),
            self.search.after.as_deref(),
            self.search.before.as_deref(),
        )
    }

    #[must_use]
    pub fn csv_options(&self) -> CsvOptions {
        CsvOptions {
            date_format: self.general.date_format.clone(),
            include_message_ids: self.export.include_message_ids,
            bom: self.export.bom,
        }
    }
}

/// Reject `strftime` strings chrono cannot render
pub fn validate_date_format(format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ExtractError::Config(format!("invalid date format '{format}'")));
    }
    Ok(())
}

// ── Load ────────────────────────────────────────────────────────

/// Load configuration.
///
/// An explicit path must exist and parse. A file found at the implicit
/// location that fails to parse is logged and replaced by the defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return read_config(path);
    }

    if let Some(path) = config_file_path()
        && path.exists()
    {
        match read_config(&path) {
            Ok(cfg) => {
                tracing::info!(path = %path.display(), "Loaded config");
                return Ok(cfg);
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to load config, using defaults"
                );
            }
        }
    }
    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path).map_err(|e| ExtractError::io(path, e))?;
    Config::from_toml(&contents)
}

/// Determine the config file path (checking env var first, then standard dirs).
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(env_path));
    }
    dirs::config_dir().map(|d| d.join("order-extract").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.template, "sephora");
        assert_eq!(cfg.general.date_format, "%Y/%m/%d");
        assert!(cfg.export.include_message_ids);
        assert_eq!(cfg.scan.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed = Config::from_toml(&toml_str).expect("deserialize");
        assert_eq!(parsed.general.template, cfg.general.template);
        assert_eq!(parsed.scan.max_tokens, cfg.scan.max_tokens);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let cfg = Config::from_toml("[export]\nbom = true\n").expect("parse");
        assert!(cfg.export.bom);
        assert!(cfg.export.include_message_ids);
        assert_eq!(cfg.general.log_level, "warn");
    }

    #[test]
    fn test_search_keys_override_query() {
        let cfg = Config::from_toml(
            "[search]\nquery = \"label:old after:2022-09-01\"\nlabel = \"sephora-arrived\"\n",
        )
        .expect("parse");
        let filter = cfg.filter().expect("filter");
        assert_eq!(filter.label.as_deref(), Some("sephora-arrived"));
        assert_eq!(filter.after, chrono::NaiveDate::from_ymd_opt(2022, 9, 1));
    }

    #[test]
    fn test_bad_date_format_rejected() {
        assert!(validate_date_format("%Y/%m/%d").is_ok());
        assert!(validate_date_format("%Q").is_err());
        assert!(Config::from_toml("[general]\ndate_format = \"%Q\"\n").is_err());
    }

    #[test]
    fn test_zero_token_budget_rejected() {
        assert!(Config::from_toml("[scan]\nmax_tokens = 0\n").is_err());
    }
}
