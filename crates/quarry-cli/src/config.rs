//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use quarry_extractor::ExtractorConfig;
use quarry_llm::gemini::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the primary API key.
pub const API_KEY_VAR: &str = "QUARRY_API_KEY";

/// Highest numbered key variable consulted (`QUARRY_API_KEY_1` ..).
pub const MAX_NUMBERED_KEYS: usize = 9;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Extraction backend settings
    #[serde(default)]
    pub provider: ProviderSettings,

    /// Retry, chunking and pacing settings
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Extraction backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// System prompt override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Instruction used when `--instruction` is not given
    #[serde(default = "default_instruction")]
    pub instruction: String,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty JSON
    Json,
    /// Table format
    Table,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".quarry").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist; a missing default file yields the
    /// default configuration.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::path()?;
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Append API keys found through `lookup` after the keys from the file.
    ///
    /// Consults `QUARRY_API_KEY`, then `QUARRY_API_KEY_1` through
    /// `QUARRY_API_KEY_9`; empty values are skipped. Duplicates are left for
    /// the credential pool to drop.
    pub fn merge_env_keys<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let names = std::iter::once(API_KEY_VAR.to_string())
            .chain((1..=MAX_NUMBERED_KEYS).map(|n| format!("{}_{}", API_KEY_VAR, n)));

        for name in names {
            if let Some(value) = lookup(&name) {
                let value = value.trim();
                if !value.is_empty() {
                    self.extractor.api_keys.push(value.to_string());
                }
            }
        }
    }

    /// Append API keys from the process environment.
    pub fn merge_process_env(&mut self) {
        self.merge_env_keys(|name| std::env::var(name).ok());
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            system_prompt: None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Json,
            instruction: default_instruction(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Json
}

fn default_instruction() -> String {
    "Extract every record in this document as a JSON array of objects, \
     one object per record, keeping field names as they appear."
        .to_string()
}
