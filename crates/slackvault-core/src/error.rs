//! # Design
//!
//! - Provide structured, constant-message errors for each pipeline stage.
//! - Keep user-facing alert text in `detail()` so error messages stay constant.
//! - Preserve source errors without interpolating context into error messages.

use slackvault_store::StoreError;
use thiserror::Error;

/// Result type for result classification.
pub type ResultResult<T> = Result<T, ResultError>;
/// Result type for primary-record serialization.
pub type SerializeResult<T> = Result<T, SerializeError>;
/// Result type for attachment downloads.
pub type FetchResult<T> = Result<T, FetchError>;
/// Result type for the persistence pipeline.
pub type PersistResult<T> = Result<T, PersistError>;
/// Result type for message permalink parsing.
pub type SlackUrlResult<T> = Result<T, SlackUrlError>;

/// Errors raised while classifying a fetched result.
#[derive(Debug, Error)]
pub enum ResultError {
    /// The result was neither a failure string nor an object.
    #[error("unsupported result shape")]
    UnsupportedShape {
        /// JSON kind that was received.
        kind: &'static str,
    },
    /// The structured result carries no file name.
    #[error("result is missing its file name")]
    MissingFileName,
    /// A reserved field held an unexpected value.
    #[error("invalid result field")]
    InvalidField {
        /// Field that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
    },
    /// Both remote and inline attachments were supplied.
    #[error("result carries both attachment references and attachment data")]
    ConflictingAttachments,
    /// A reserved field could not be decoded.
    #[error("result field decode failure")]
    Decode {
        /// Field being decoded.
        field: &'static str,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

impl ResultError {
    /// Render the error together with its structured context.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::UnsupportedShape { kind } => format!("{self}: {kind}"),
            Self::InvalidField { field, reason } => format!("{self}: {field} ({reason})"),
            Self::Decode { field, source } => format!("{self}: {field} ({source})"),
            Self::MissingFileName | Self::ConflictingAttachments => self.to_string(),
        }
    }
}

/// Errors raised while encoding the primary record.
#[derive(Debug, Error)]
#[error("primary record serialization failure")]
pub struct SerializeError {
    /// Underlying JSON error.
    #[from]
    pub source: serde_json::Error,
}

/// Errors raised while downloading an attachment.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be built.
    #[error("invalid attachment request")]
    InvalidRequest {
        /// Request field that was rejected.
        field: &'static str,
        /// Offending value.
        value: String,
    },
    /// The HTTP client could not be constructed.
    #[error("http client construction failed")]
    Client {
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// The request failed before a response arrived, or the body was unreadable.
    #[error("attachment transport failure")]
    Transport {
        /// Requested URL.
        url: String,
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// The server answered with a non-success status.
    #[error("attachment request rejected")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
}

impl FetchError {
    /// Render the error together with its structured context.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::InvalidRequest { field, value } => format!("{self}: {field}={value}"),
            Self::Client { source } => format!("{self}: {source}"),
            Self::Transport { url, source } => format!("{self}: {url} ({source})"),
            Self::Status { url, status } => format!("{self}: {url} (HTTP {status})"),
        }
    }
}

/// Errors raised by a notification sink.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The clipboard command could not be run.
    #[error("clipboard command failed to run")]
    ClipboardSpawn {
        /// Command line that was attempted.
        command: String,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// The clipboard command exited unsuccessfully.
    #[error("clipboard command exited unsuccessfully")]
    ClipboardStatus {
        /// Command line that was attempted.
        command: String,
        /// Exit code when the process exited normally.
        code: Option<i32>,
    },
    /// The clipboard is not reachable.
    #[error("clipboard unavailable")]
    ClipboardUnavailable {
        /// Static reason for the failure.
        reason: &'static str,
    },
}

impl NotifyError {
    /// Render the error together with its structured context.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::ClipboardSpawn { command, source } => format!("{self}: {command} ({source})"),
            Self::ClipboardStatus {
                command,
                code: Some(code),
            } => format!("{self}: {command} (exit {code})"),
            Self::ClipboardStatus { command, code: None } => {
                format!("{self}: {command} (terminated by signal)")
            }
            Self::ClipboardUnavailable { reason } => format!("{self}: {reason}"),
        }
    }
}

/// Errors raised while parsing a message permalink.
#[derive(Debug, Error)]
pub enum SlackUrlError {
    /// The text is not a URL.
    #[error("message link is not a valid url")]
    Parse {
        /// Underlying URL parse error.
        source: url::ParseError,
    },
    /// No path segment looks like a conversation id.
    #[error("message link has no channel id")]
    MissingChannel,
    /// No path segment carries a message timestamp.
    #[error("message link has no message timestamp")]
    MissingTimestamp,
    /// The timestamp segment is malformed.
    #[error("message link timestamp is malformed")]
    InvalidTimestamp {
        /// Offending path segment.
        segment: String,
    },
}

impl SlackUrlError {
    /// Render the error together with its structured context.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Parse { source } => format!("{self}: {source}"),
            Self::InvalidTimestamp { segment } => format!("{self}: {segment}"),
            Self::MissingChannel | Self::MissingTimestamp => self.to_string(),
        }
    }
}

/// Errors that end a persistence run.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The upstream fetch reported a failure instead of a result.
    #[error("conversation fetch failed")]
    Fetch {
        /// Failure message reported by the fetcher.
        message: String,
    },
    /// The raw result could not be classified.
    #[error("fetched result rejected")]
    Input {
        /// Underlying classification error.
        #[from]
        source: ResultError,
    },
    /// The primary record could not be encoded.
    #[error("primary record encoding failed")]
    Serialize {
        /// Underlying serialization error.
        #[from]
        source: SerializeError,
    },
    /// A file-store operation failed.
    #[error("vault operation failed")]
    Storage {
        /// Pipeline operation in progress.
        operation: &'static str,
        /// Vault path involved.
        path: String,
        /// Underlying store error.
        source: StoreError,
    },
    /// A collision was reported but no existing file matched the path.
    #[error("existing file could not be located for replacement")]
    CollisionUnresolved {
        /// Vault path that collided.
        path: String,
    },
    /// An attachment would be written over the primary record.
    #[error("attachment name collides with the record file")]
    AttachmentShadowsRecord {
        /// Attachment name.
        name: String,
        /// Vault path of the primary record.
        path: String,
    },
    /// An attachment download failed.
    #[error("attachment download failed")]
    Attachment {
        /// Attachment name.
        name: String,
        /// Underlying fetch error.
        source: FetchError,
    },
    /// The clipboard could not be updated after a successful write.
    #[error("clipboard update failed")]
    Clipboard {
        /// Underlying notifier error.
        source: NotifyError,
    },
}

impl PersistError {
    pub(crate) fn storage(operation: &'static str, path: &str, source: StoreError) -> Self {
        Self::Storage {
            operation,
            path: path.to_string(),
            source,
        }
    }

    /// Alert text shown to the user. Fetch failures surface their original
    /// message unchanged.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Fetch { message } => message.clone(),
            Self::Input { source } => format!("{self}: {}", source.detail()),
            Self::Serialize { source } => format!("{self}: {}", source.source),
            Self::Storage {
                operation,
                path,
                source,
            } => format!("{self}: {operation} {path} ({})", source.detail()),
            Self::CollisionUnresolved { path } => format!("{self}: {path}"),
            Self::AttachmentShadowsRecord { name, path } => format!("{self}: {name} ({path})"),
            Self::Attachment { name, source } => format!("{self}: {name} ({})", source.detail()),
            Self::Clipboard { source } => format!("{self}: {}", source.detail()),
        }
    }
}
