//! Run context propagation for a single CLI invocation.
//!
//! # Design
//! - Keeps the run identifier and command name in task-local storage so
//!   collaborators deep in the pipeline can tag their logs without plumbing.

use std::future::Future;
use std::sync::Arc;

use crate::init::build_sha;

/// Execute `fut` inside a `run` span with the run identifier available to
/// [`current_run_id`] and [`current_command`].
pub async fn with_run_context<Fut, T>(
    run_id: impl Into<String>,
    command: impl Into<String>,
    fut: Fut,
) -> T
where
    Fut: Future<Output = T>,
{
    let context = RunContext {
        run_id: Arc::from(run_id.into()),
        command: Arc::from(command.into()),
    };
    let span = tracing::info_span!(
        "run",
        run_id = %context.run_id,
        command = %context.command,
        build_sha = %build_sha()
    );
    ACTIVE_RUN_CONTEXT
        .scope(context, tracing::Instrument::instrument(fut, span))
        .await
}

/// Retrieve the identifier of the active run, if any.
#[must_use]
pub fn current_run_id() -> Option<String> {
    ACTIVE_RUN_CONTEXT
        .try_with(|ctx| ctx.run_id.as_ref().to_string())
        .ok()
}

/// Retrieve the command name of the active run, if any.
#[must_use]
pub fn current_command() -> Option<String> {
    ACTIVE_RUN_CONTEXT
        .try_with(|ctx| ctx.command.as_ref().to_string())
        .ok()
}

#[derive(Clone)]
struct RunContext {
    run_id: Arc<str>,
    command: Arc<str>,
}

tokio::task_local! {
    static ACTIVE_RUN_CONTEXT: RunContext;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn with_run_context_exposes_identifiers() {
        let output = with_run_context("run-42", "save", async {
            assert_eq!(current_run_id().as_deref(), Some("run-42"));
            assert_eq!(current_command().as_deref(), Some("save"));
            "done"
        })
        .await;
        assert_eq!(output, "done");
        assert!(current_run_id().is_none());
        assert!(current_command().is_none());
    }
}
