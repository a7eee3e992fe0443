//! Error types for configuration loading.
//!
//! # Design
//! - Constant error messages; context lives in structured fields.
//! - Preserve source errors so callers can render full chains.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the configuration file failed.
    #[error("failed to read configuration file")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path that was being read.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// The configuration document was not valid JSON for the expected shape.
    #[error("failed to parse configuration document")]
    Parse {
        /// Human-readable origin of the document (file path or `inline`).
        origin: String,
        /// Source JSON error.
        source: serde_json::Error,
    },
    /// A required field was not provided by the file or the overrides.
    #[error("missing configuration field")]
    MissingField {
        /// Section containing the field.
        section: &'static str,
        /// Name of the missing field.
        field: &'static str,
    },
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Section that failed validation.
        section: &'static str,
        /// Field that failed validation.
        field: &'static str,
        /// Offending value when available.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
}

impl ConfigError {
    pub(crate) const fn invalid(
        section: &'static str,
        field: &'static str,
        value: Option<String>,
        reason: &'static str,
    ) -> Self {
        Self::InvalidField {
            section,
            field,
            value,
            reason,
        }
    }

    /// Render the error together with its structured context on one line.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Io {
                operation,
                path,
                source,
            } => format!("{self}: {operation} {} ({source})", path.display()),
            Self::Parse { origin, source } => format!("{self}: {origin} ({source})"),
            Self::MissingField { section, field } => format!("{self}: {section}.{field}"),
            Self::InvalidField {
                section,
                field,
                value,
                reason,
            } => match value {
                Some(value) => format!("{self}: {section}.{field}={value} ({reason})"),
                None => format!("{self}: {section}.{field} ({reason})"),
            },
        }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn detail_includes_structured_context() {
        let err = ConfigError::invalid("http", "timeout_secs", Some("0".into()), "out_of_range");
        assert_eq!(
            err.detail(),
            "invalid configuration field: http.timeout_secs=0 (out_of_range)"
        );

        let missing = ConfigError::MissingField {
            section: "vault",
            field: "root",
        };
        assert_eq!(missing.detail(), "missing configuration field: vault.root");
    }

    #[test]
    fn io_errors_preserve_source() {
        let err = ConfigError::Io {
            operation: "config.read",
            path: PathBuf::from("missing.json"),
            source: io::Error::other("io"),
        };
        assert!(err.source().is_some());
        assert!(err.detail().contains("missing.json"));
    }
}
