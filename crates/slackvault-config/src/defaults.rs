//! Default values applied when the configuration document omits a field.

/// Vault setting key that names the attachment folder.
pub const ATTACHMENT_FOLDER_KEY: &str = "attachmentFolderPath";
/// HTTP timeout applied to attachment downloads, in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;
/// Upper bound accepted for the HTTP timeout, in seconds.
pub const HTTP_TIMEOUT_MAX_SECS: u64 = 600;
/// Log level used when neither the file nor `RUST_LOG` provide one.
pub const LOG_LEVEL: &str = "info";

/// User agent sent with attachment downloads.
#[must_use]
pub fn user_agent() -> String {
    format!("slackvault/{}", env!("CARGO_PKG_VERSION"))
}
