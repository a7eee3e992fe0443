//! User-facing notification seam.

use async_trait::async_trait;

use crate::error::NotifyError;

/// Surfaces the outcome of a persistence run to the user.
///
/// The pipeline calls either `copy_to_clipboard` followed by `notify_success`,
/// or `alert` alone. Never both, and only once per run.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Place `text` on the clipboard.
    async fn copy_to_clipboard(&self, text: &str) -> Result<(), NotifyError>;

    /// Report a successful run.
    async fn notify_success(&self, message: &str);

    /// Report a failed run.
    async fn alert(&self, message: &str);
}
