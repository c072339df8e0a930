//! `kbrow.toml` settings.
//!
//! ```toml
//! [text]
//! delimiter = "tab"      # space | tab | comma | <single char>
//! exact_floats = false
//! header = true
//!
//! [sql]
//! dialect = "sqlite"     # sqlite | generic
//!
//! [audit]
//! enabled = true
//! path = "kbrow.events.jsonl"
//! actor = "cli"
//! ```

use crate::core::error::KbError;
use crate::core::sql::Dialect;
use crate::core::text::{Delimiter, TextOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "kbrow.toml";
pub const DEFAULT_AUDIT_LOG: &str = "kbrow.events.jsonl";
/// Overrides `[audit] path` when set.
pub const AUDIT_LOG_ENV: &str = "KBROW_AUDIT_LOG";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct KbConfig {
    pub text: TextConfig,
    pub sql: SqlConfig,
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TextConfig {
    pub delimiter: String,
    pub exact_floats: bool,
    pub header: bool,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            delimiter: "space".to_string(),
            exact_floats: false,
            header: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SqlConfig {
    pub dialect: Dialect,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditConfig {
    pub enabled: bool,
    pub path: Option<PathBuf>,
    pub actor: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
            actor: "cli".to_string(),
        }
    }
}

impl KbConfig {
    pub fn text_options(&self) -> Result<TextOptions, KbError> {
        Ok(TextOptions {
            delimiter: Delimiter::parse(&self.text.delimiter)?,
            exact_floats: self.text.exact_floats,
        })
    }

    /// Where audit events go, relative paths resolved against `base`.
    /// `None` when auditing is disabled.
    pub fn audit_log_path(&self, base: &Path) -> Option<PathBuf> {
        if !self.audit.enabled {
            return None;
        }
        let path = std::env::var_os(AUDIT_LOG_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| self.audit.path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_AUDIT_LOG));
        Some(if path.is_absolute() { path } else { base.join(path) })
    }
}

pub fn parse_config(content: &str) -> Result<KbConfig, KbError> {
    let config: KbConfig =
        toml::from_str(content).map_err(|e| KbError::ConfigError(e.to_string()))?;
    // surface a bad delimiter at load time rather than at first use
    config.text_options()?;
    Ok(config)
}

/// Loads `explicit` if given (it must exist), else `<dir>/kbrow.toml` if present.
/// No config file means defaults.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<KbConfig, KbError> {
    if let Some(path) = explicit {
        let content = fs::read_to_string(path).map_err(|e| {
            KbError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        return parse_config(&content);
    }

    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        let content = fs::read_to_string(&config_path).map_err(KbError::IoError)?;
        return parse_config(&content);
    }

    Ok(KbConfig::default())
}
