//! Console notifications and clipboard hand-off.

use std::process::Stdio;

use async_trait::async_trait;
use slackvault_core::{Notifier, NotifyError};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Prints run outcomes to stderr and pipes the saved file name into an
/// external clipboard command such as `pbcopy` or `wl-copy`. Stdout stays
/// reserved for the rendered report.
pub(crate) struct ConsoleNotifier {
    clipboard_command: Option<String>,
}

impl ConsoleNotifier {
    pub(crate) fn new(clipboard_command: Option<String>) -> Self {
        Self {
            clipboard_command: clipboard_command.filter(|command| !command.trim().is_empty()),
        }
    }

    async fn pipe_into(command_line: &str, text: &str) -> Result<(), NotifyError> {
        let mut parts = command_line.split_whitespace();
        let program = parts.next().ok_or(NotifyError::ClipboardUnavailable {
            reason: "empty_command",
        })?;
        let spawn_error = |source| NotifyError::ClipboardSpawn {
            command: command_line.to_string(),
            source,
        };

        let mut child = Command::new(program)
            .args(parts)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(spawn_error)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await.map_err(spawn_error)?;
            stdin.shutdown().await.map_err(spawn_error)?;
        }
        let status = child.wait().await.map_err(spawn_error)?;
        if status.success() {
            debug!(command = command_line, "clipboard updated");
            Ok(())
        } else {
            Err(NotifyError::ClipboardStatus {
                command: command_line.to_string(),
                code: status.code(),
            })
        }
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn copy_to_clipboard(&self, text: &str) -> Result<(), NotifyError> {
        match &self.clipboard_command {
            Some(command) => Self::pipe_into(command, text).await,
            None => {
                eprintln!("clipboard: {text}");
                Ok(())
            }
        }
    }

    async fn notify_success(&self, message: &str) {
        eprintln!("{message}");
    }

    async fn alert(&self, message: &str) {
        warn!(alert = message, "run failed");
        eprintln!("alert: {message}");
    }
}
