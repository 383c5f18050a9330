//! Ledger configuration, persisted as TOML.
//!
//! Lives at `$XDG_CONFIG_HOME/book-ledger/config.toml`. Every field has a
//! default, so a partial (or missing) file is fine. The admin secret can be
//! supplied through `LEDGER_ADMIN_PASS` instead of the file.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::AdminGate;
use crate::llm::LlmConfig;
use crate::recommend::prompt::{DEFAULT_COUNT, PromptRequest};

/// Environment variable that overrides `admin_password`.
pub const ADMIN_PASS_ENV: &str = "LEDGER_ADMIN_PASS";

/// Errors from config handling.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(ledger::config::read),
        help("Ensure the config file is readable, or run `ledger init` to create one.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}")]
    #[diagnostic(code(ledger::config::parse), help("Check the TOML syntax: {message}"))]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(ledger::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Recommendation defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationSettings {
    /// Number of recommendations requested when the CLI doesn't say.
    #[serde(default = "default_count")]
    pub default_count: u8,
}

fn default_count() -> u8 {
    DEFAULT_COUNT
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            default_count: default_count(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Data directory override; XDG data dir when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Shared admin secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub recommendations: RecommendationSettings,
}

impl LedgerConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load from `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Apply an admin secret override (typically from [`ADMIN_PASS_ENV`]).
    pub fn with_admin_override(mut self, secret: Option<String>) -> Self {
        if let Some(secret) = secret.filter(|s| !s.is_empty()) {
            self.admin_password = Some(secret);
        }
        self
    }

    /// Gate built from the configured secret.
    pub fn admin_gate(&self) -> AdminGate {
        AdminGate::new(self.admin_password.clone())
    }

    /// Default recommendation request.
    pub fn prompt_request(&self) -> PromptRequest {
        PromptRequest {
            count: self.recommendations.default_count,
            ..Default::default()
        }
    }
}
