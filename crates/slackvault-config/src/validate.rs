//! Validation helpers applied to the merged configuration.

use std::path::Path;

use crate::defaults::HTTP_TIMEOUT_MAX_SECS;
use crate::error::{ConfigError, ConfigResult};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["pretty", "json"];

pub(crate) fn validate_root(root: &Path) -> ConfigResult<()> {
    if root.as_os_str().is_empty() {
        return Err(ConfigError::invalid("vault", "root", None, "empty"));
    }
    Ok(())
}

pub(crate) fn validate_setting_key(key: &str) -> ConfigResult<()> {
    if key.trim().is_empty() {
        return Err(ConfigError::invalid(
            "vault",
            "attachment_folder_key",
            Some(key.to_string()),
            "empty",
        ));
    }
    Ok(())
}

pub(crate) fn validate_timeout(timeout_secs: u64) -> ConfigResult<()> {
    if timeout_secs == 0 || timeout_secs > HTTP_TIMEOUT_MAX_SECS {
        return Err(ConfigError::invalid(
            "http",
            "timeout_secs",
            Some(timeout_secs.to_string()),
            "out_of_range",
        ));
    }
    Ok(())
}

pub(crate) fn validate_user_agent(user_agent: &str) -> ConfigResult<()> {
    if user_agent.trim().is_empty() || user_agent.chars().any(char::is_control) {
        return Err(ConfigError::invalid(
            "http",
            "user_agent",
            Some(user_agent.to_string()),
            "not_a_header_value",
        ));
    }
    Ok(())
}

pub(crate) fn validate_log_level(level: &str) -> ConfigResult<()> {
    if LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            "telemetry",
            "level",
            Some(level.to_string()),
            "unknown_level",
        ))
    }
}

pub(crate) fn validate_log_format(format: Option<&str>) -> ConfigResult<()> {
    match format {
        Some(value) if !LOG_FORMATS.contains(&value) => Err(ConfigError::invalid(
            "telemetry",
            "log_format",
            Some(value.to_string()),
            "expected_pretty_or_json",
        )),
        _ => Ok(()),
    }
}
