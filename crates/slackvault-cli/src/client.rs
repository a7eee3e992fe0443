//! Shared errors, configuration loading, and telemetry wiring for the CLI.

use std::fmt::{self, Display, Formatter};
use std::path::Path;

use anyhow::anyhow;
use slackvault_config::{AppConfig, ConfigError, ConfigOverrides, TelemetryConfig, load_config};
use slackvault_telemetry::{
    LogFormat, LoggingConfig, build_sha, init_logging, log_format_from_config,
};

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io { .. } => Self::failure(anyhow!(err.detail())),
            _ => Self::validation(err.detail()),
        }
    }
}

/// Load the configuration file (when given) and layer the command-line
/// overrides on top.
pub(crate) fn load_app_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> CliResult<AppConfig> {
    Ok(load_config(path, overrides)?)
}

/// Install the tracing subscriber described by the telemetry settings.
pub(crate) fn init_telemetry(telemetry: &TelemetryConfig) -> CliResult<()> {
    let document = serde_json::to_value(telemetry)
        .map_err(|err| CliError::failure(anyhow!("failed to encode telemetry settings: {err}")))?;
    let format = log_format_from_config(Some(&document)).unwrap_or_else(LogFormat::infer);
    init_logging(&LoggingConfig {
        level: &telemetry.level,
        format,
        build_sha: option_env!("SLACKVAULT_BUILD_SHA").unwrap_or_else(build_sha),
    })
    .map_err(CliError::failure)
}

/// Reject credentials that are missing or blank.
pub(crate) fn require_credential<'a>(
    flag: &'static str,
    value: Option<&'a str>,
) -> CliResult<&'a str> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(CliError::validation(format!(
            "{flag} is required and must not be empty"
        ))),
    }
}
