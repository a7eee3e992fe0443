//! Configuration loading: read the JSON document, layer overrides, validate.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::defaults::{self, ATTACHMENT_FOLDER_KEY, HTTP_TIMEOUT_SECS, LOG_LEVEL};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{
    AppConfig, ConfigDocument, ConfigOverrides, HttpConfig, TelemetryConfig, VaultConfig,
};
use crate::validate::{
    validate_log_format, validate_log_level, validate_root, validate_setting_key,
    validate_timeout, validate_user_agent,
};

/// Load the configuration from an optional file and apply caller overrides.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed, when no vault root
/// is available, or when any field fails validation.
pub fn load_config(path: Option<&Path>, overrides: ConfigOverrides) -> ConfigResult<AppConfig> {
    let document = match path {
        Some(path) => read_document(path)?,
        None => ConfigDocument::default(),
    };
    resolve(document, overrides)
}

/// Parse a configuration document from a JSON string.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] when the text is not a valid document.
pub fn parse_document(raw: &str, origin: &str) -> ConfigResult<ConfigDocument> {
    serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
        origin: origin.to_string(),
        source,
    })
}

fn read_document(path: &Path) -> ConfigResult<ConfigDocument> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        operation: "config.read",
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded configuration document");
    parse_document(&raw, &path.display().to_string())
}

/// Merge a document with overrides, fill defaults, and validate the result.
///
/// # Errors
///
/// Returns an error when the vault root is missing or a field is invalid.
pub fn resolve(document: ConfigDocument, overrides: ConfigOverrides) -> ConfigResult<AppConfig> {
    let ConfigDocument {
        vault,
        http,
        telemetry,
    } = document;

    let root = overrides
        .vault_root
        .or(vault.root)
        .ok_or(ConfigError::MissingField {
            section: "vault",
            field: "root",
        })?;
    validate_root(&root)?;

    let attachment_folder_key = vault
        .attachment_folder_key
        .unwrap_or_else(|| ATTACHMENT_FOLDER_KEY.to_string());
    validate_setting_key(&attachment_folder_key)?;

    let timeout_secs = overrides
        .timeout_secs
        .or(http.timeout_secs)
        .unwrap_or(HTTP_TIMEOUT_SECS);
    validate_timeout(timeout_secs)?;

    let user_agent = http.user_agent.unwrap_or_else(defaults::user_agent);
    validate_user_agent(&user_agent)?;

    let level = overrides
        .log_level
        .or(telemetry.level)
        .unwrap_or_else(|| LOG_LEVEL.to_string());
    validate_log_level(&level)?;
    validate_log_format(telemetry.log_format.as_deref())?;

    Ok(AppConfig {
        vault: VaultConfig {
            root,
            trash_mode: overrides.trash_mode.or(vault.trash_mode).unwrap_or_default(),
            attachment_folder_key,
            attachment_folder: overrides.attachment_folder.or(vault.attachment_folder),
        },
        http: HttpConfig {
            timeout_secs,
            user_agent,
        },
        telemetry: TelemetryConfig {
            level,
            log_format: telemetry.log_format,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TrashMode;
    use std::path::PathBuf;

    #[test]
    fn resolve_applies_defaults() -> ConfigResult<()> {
        let document = parse_document(r#"{"vault": {"root": "/notes"}}"#, "inline")?;
        let config = resolve(document, ConfigOverrides::default())?;
        assert_eq!(config.vault.root, PathBuf::from("/notes"));
        assert_eq!(config.vault.trash_mode, TrashMode::Local);
        assert_eq!(config.vault.attachment_folder_key, ATTACHMENT_FOLDER_KEY);
        assert_eq!(config.vault.attachment_folder, None);
        assert_eq!(config.http.timeout_secs, HTTP_TIMEOUT_SECS);
        assert!(config.http.user_agent.starts_with("slackvault/"));
        assert_eq!(config.telemetry.level, LOG_LEVEL);
        Ok(())
    }

    #[test]
    fn overrides_take_precedence_over_document() -> ConfigResult<()> {
        let document = parse_document(
            r#"{
                "vault": {"root": "/notes", "trash_mode": "system", "attachment_folder": "files"},
                "http": {"timeout_secs": 5}
            }"#,
            "inline",
        )?;
        let overrides = ConfigOverrides {
            vault_root: Some(PathBuf::from("/other")),
            attachment_folder: Some("att".into()),
            trash_mode: Some(TrashMode::Local),
            timeout_secs: Some(60),
            log_level: Some("debug".into()),
        };
        let config = resolve(document, overrides)?;
        assert_eq!(config.vault.root, PathBuf::from("/other"));
        assert_eq!(config.vault.attachment_folder.as_deref(), Some("att"));
        assert_eq!(config.vault.trash_mode, TrashMode::Local);
        assert_eq!(config.http.timeout_secs, 60);
        assert_eq!(config.telemetry.level, "debug");
        Ok(())
    }

    #[test]
    fn missing_root_is_reported() {
        let result = resolve(ConfigDocument::default(), ConfigOverrides::default());
        assert!(matches!(
            result,
            Err(ConfigError::MissingField {
                section: "vault",
                field: "root"
            })
        ));
    }

    #[test]
    fn unknown_fields_fail_to_parse() {
        let result = parse_document(r#"{"vault": {"rooot": "/notes"}}"#, "inline");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
