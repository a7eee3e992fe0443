use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow};
use serde_json::Value;
use slackvault_config::AppConfig;
use slackvault_core::{HttpTransport, PersistOutcome, PersistReport, Persister};
use slackvault_store::LocalVault;
use tokio::io::AsyncReadExt;
use tracing::info;

use crate::cli::{OutputFormat, SaveArgs};
use crate::client::{CliError, CliResult, require_credential};
use crate::notifier::ConsoleNotifier;
use crate::output::render_report;

const STDIN_MARKER: &str = "-";

pub(crate) async fn handle_save(
    config: &AppConfig,
    args: SaveArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let report = execute_save(config, args).await?;
    render_report(&report, format)?;
    match report.outcome {
        PersistOutcome::Success { .. } => Ok(()),
        PersistOutcome::Failure { message } => Err(CliError::failure(anyhow!(message))),
    }
}

async fn execute_save(config: &AppConfig, args: SaveArgs) -> CliResult<PersistReport> {
    let cookie = require_credential("--cookie", args.cookie.as_deref())?;
    if args.token.is_some() {
        require_credential("--token", args.token.as_deref())?;
    }

    let value = read_input(&args.input).await?;
    let persister = build_persister(config, args.clipboard_command).await?;
    info!(
        input = %args.input,
        vault = %config.vault.root.display(),
        "saving fetched result"
    );
    Ok(persister.process_json(cookie, value).await)
}

async fn read_input(input: &str) -> CliResult<Value> {
    let raw = if input == STDIN_MARKER {
        let mut raw = String::new();
        tokio::io::stdin()
            .read_to_string(&mut raw)
            .await
            .context("failed to read standard input")
            .map_err(CliError::failure)?;
        raw
    } else {
        tokio::fs::read_to_string(input)
            .await
            .with_context(|| format!("failed to read {input}"))
            .map_err(CliError::failure)?
    };
    serde_json::from_str(&raw)
        .map_err(|err| CliError::validation(format!("input is not valid JSON: {err}")))
}

async fn build_persister(
    config: &AppConfig,
    clipboard_command: Option<String>,
) -> CliResult<Persister> {
    let vault = LocalVault::from_config(&config.vault)
        .await
        .map_err(|err| CliError::failure(anyhow!(err.detail())))?;
    let transport = HttpTransport::new(
        Duration::from_secs(config.http.timeout_secs),
        &config.http.user_agent,
    )
    .map_err(|err| CliError::failure(anyhow!(err.detail())))?;

    Ok(Persister::new(
        Arc::new(vault),
        Arc::new(transport),
        Arc::new(ConsoleNotifier::new(clipboard_command)),
    )
    .with_attachment_folder_key(config.vault.attachment_folder_key.clone()))
}
