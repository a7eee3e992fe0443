//! # Design
//!
//! - Provide structured, constant-message errors for vault operations.
//! - Keep "path already exists" distinguishable from every other failure; the
//!   persistence pipeline recovers from it and nothing else.
//! - Preserve source errors without interpolating context into error messages.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for vault operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors produced by the vault file store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A file or folder already occupies the requested path.
    #[error("file already exists")]
    AlreadyExists {
        /// Vault-relative path that was occupied.
        path: String,
    },
    /// A vault path could not be normalised.
    #[error("invalid vault path")]
    InvalidPath {
        /// Raw path as supplied by the caller.
        path: String,
        /// Static reason for the failure.
        reason: &'static str,
    },
    /// The referenced file does not exist.
    #[error("file not found")]
    NotFound {
        /// Vault-relative path that was missing.
        path: String,
    },
    /// The vault root is missing or not a directory.
    #[error("vault root unavailable")]
    RootUnavailable {
        /// Root directory on disk.
        root: PathBuf,
    },
    /// IO failures while interacting with the filesystem.
    #[error("vault io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The vault settings file could not be parsed.
    #[error("vault settings parse failure")]
    Settings {
        /// Settings file path.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// Walkdir traversal failures.
    #[error("vault walk failure")]
    Walkdir {
        /// Root of the traversal.
        path: PathBuf,
        /// Underlying walkdir error.
        source: walkdir::Error,
    },
    /// The operating system trash rejected the file.
    #[error("system trash failure")]
    SystemTrash {
        /// File handed to the trash.
        path: PathBuf,
        /// Underlying trash error.
        source: trash::Error,
    },
    /// A blocking task panicked or was cancelled.
    #[error("vault background task failed")]
    Task {
        /// Operation that ran on the blocking pool.
        operation: &'static str,
        /// Underlying join error.
        source: tokio::task::JoinError,
    },
}

impl StoreError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_path(path: &str, reason: &'static str) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason,
        }
    }

    /// Whether the failure means the target path is already occupied.
    #[must_use]
    pub const fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Render the error together with its structured context on one line.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::AlreadyExists { path } | Self::NotFound { path } => format!("{self}: {path}"),
            Self::InvalidPath { path, reason } => format!("{self}: {path} ({reason})"),
            Self::RootUnavailable { root } => format!("{self}: {}", root.display()),
            Self::Io {
                operation,
                path,
                source,
            } => format!("{self}: {operation} {} ({source})", path.display()),
            Self::Settings { path, source } => format!("{self}: {} ({source})", path.display()),
            Self::Walkdir { path, source } => format!("{self}: {} ({source})", path.display()),
            Self::SystemTrash { path, source } => {
                format!("{self}: {} ({source})", path.display())
            }
            Self::Task { operation, source } => format!("{self}: {operation} ({source})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn already_exists_is_distinguishable() {
        let collision = StoreError::AlreadyExists {
            path: "att/msg1.json".into(),
        };
        assert!(collision.is_already_exists());
        assert_eq!(collision.detail(), "file already exists: att/msg1.json");

        let io_err = StoreError::io("file.create", "att/msg1.json", io::Error::other("disk full"));
        assert!(!io_err.is_already_exists());
        assert!(io_err.source().is_some());
        assert!(io_err.detail().contains("disk full"));
    }

    #[test]
    fn invalid_path_helper_records_reason() {
        let err = StoreError::invalid_path("../escape", "parent_segment");
        assert!(matches!(
            err,
            StoreError::InvalidPath {
                reason: "parent_segment",
                ..
            }
        ));
    }
}
