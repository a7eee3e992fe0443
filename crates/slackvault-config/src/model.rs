//! Typed configuration models.
//!
//! # Design
//! - `ConfigDocument` mirrors the on-disk JSON with every field optional.
//! - `AppConfig` is the validated, fully-defaulted view handed to services.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Effective configuration after defaults, overrides, and validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    /// Vault location and file-store behaviour.
    pub vault: VaultConfig,
    /// Attachment download settings.
    pub http: HttpConfig,
    /// Logging settings.
    pub telemetry: TelemetryConfig,
}

/// Vault location and file-store behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VaultConfig {
    /// Directory holding the vault.
    pub root: PathBuf,
    /// How superseded files are disposed of.
    pub trash_mode: TrashMode,
    /// Vault setting key consulted for the attachment folder.
    pub attachment_folder_key: String,
    /// Attachment folder that takes precedence over the vault's own setting.
    pub attachment_folder: Option<String>,
}

/// Attachment download settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpConfig {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// User agent header value.
    pub user_agent: String,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelemetryConfig {
    /// Default log level when `RUST_LOG` is unset.
    pub level: String,
    /// Optional log format name (`pretty` or `json`).
    pub log_format: Option<String>,
}

/// Disposal strategy for files replaced on collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrashMode {
    /// Move into the vault-local `.trash` folder.
    #[default]
    Local,
    /// Hand the file to the operating system trash.
    System,
}

impl TrashMode {
    /// Render the mode as its lowercase string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::System => "system",
        }
    }
}

impl fmt::Display for TrashMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrashMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "local" => Ok(Self::Local),
            "system" => Ok(Self::System),
            other => Err(ConfigError::invalid(
                "vault",
                "trash_mode",
                Some(other.to_string()),
                "expected_local_or_system",
            )),
        }
    }
}

/// Raw configuration document as stored on disk.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigDocument {
    /// Vault section.
    pub vault: VaultDocument,
    /// HTTP section.
    pub http: HttpDocument,
    /// Telemetry section.
    pub telemetry: TelemetryDocument,
}

/// Raw `vault` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VaultDocument {
    /// Vault directory.
    pub root: Option<PathBuf>,
    /// Trash mode.
    pub trash_mode: Option<TrashMode>,
    /// Attachment folder setting key.
    pub attachment_folder_key: Option<String>,
    /// Attachment folder override.
    pub attachment_folder: Option<String>,
}

/// Raw `http` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpDocument {
    /// Timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// User agent.
    pub user_agent: Option<String>,
}

/// Raw `telemetry` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TelemetryDocument {
    /// Log level.
    pub level: Option<String>,
    /// Log format.
    pub log_format: Option<String>,
}

/// Values supplied by the caller (flags, environment) that win over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Vault directory.
    pub vault_root: Option<PathBuf>,
    /// Attachment folder.
    pub attachment_folder: Option<String>,
    /// Trash mode.
    pub trash_mode: Option<TrashMode>,
    /// HTTP timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Log level.
    pub log_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trash_mode_parses_known_values() {
        assert_eq!("local".parse::<TrashMode>().ok(), Some(TrashMode::Local));
        assert_eq!(" system ".parse::<TrashMode>().ok(), Some(TrashMode::System));
        assert!(matches!(
            "bin".parse::<TrashMode>(),
            Err(ConfigError::InvalidField {
                field: "trash_mode",
                ..
            })
        ));
        assert_eq!(TrashMode::System.to_string(), "system");
    }
}
