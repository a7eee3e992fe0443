//! Output renderers and formatting helpers for CLI commands.

use std::fmt::{self, Write as _};

use anyhow::anyhow;
use serde::Serialize;
use slackvault_config::AppConfig;
use slackvault_core::slack_url::SlackUrl;
use slackvault_core::{PersistOutcome, PersistReport};
use slackvault_telemetry::current_run_id;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

pub(crate) fn render_report(report: &PersistReport, format: OutputFormat) -> CliResult<()> {
    println!("{}", format_report(report, format)?);
    Ok(())
}

pub(crate) fn format_report(report: &PersistReport, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(report),
        OutputFormat::Table => {
            let mut text = String::new();
            if let Some(run_id) = current_run_id() {
                push_line(&mut text, format_args!("run: {run_id}"));
            }
            match &report.outcome {
                PersistOutcome::Success { file_name } => {
                    push_line(&mut text, format_args!("saved: {file_name}"));
                }
                PersistOutcome::Failure { message } => {
                    push_line(&mut text, format_args!("failed: {message}"));
                }
            }
            push_line(&mut text, format_args!("state: {}", report.state.as_str()));
            let elapsed = report.finished_at - report.started_at;
            push_line(
                &mut text,
                format_args!("elapsed: {}ms", elapsed.num_milliseconds()),
            );
            if !report.files_written.is_empty() {
                push_line(&mut text, format_args!("files:"));
                for path in &report.files_written {
                    push_line(&mut text, format_args!("  {path}"));
                }
            }
            push_line(
                &mut text,
                format_args!("{:<18} {:<10} SUBJECT", "STEP", "STATUS"),
            );
            for record in &report.steps {
                push_line(
                    &mut text,
                    format_args!(
                        "{:<18} {:<10} {}",
                        record.step.as_str(),
                        record.status.as_str(),
                        record.subject.as_deref().unwrap_or("-")
                    ),
                );
            }
            Ok(text.trim_end().to_string())
        }
    }
}

pub(crate) fn render_config(config: &AppConfig, format: OutputFormat) -> CliResult<()> {
    println!("{}", format_config(config, format)?);
    Ok(())
}

pub(crate) fn format_config(config: &AppConfig, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(config),
        OutputFormat::Table => {
            let vault = &config.vault;
            let mut text = String::new();
            push_line(&mut text, format_args!("vault.root: {}", vault.root.display()));
            push_line(&mut text, format_args!("vault.trash_mode: {}", vault.trash_mode));
            push_line(
                &mut text,
                format_args!("vault.attachment_folder_key: {}", vault.attachment_folder_key),
            );
            push_line(
                &mut text,
                format_args!(
                    "vault.attachment_folder: {}",
                    vault.attachment_folder.as_deref().unwrap_or("<vault setting>")
                ),
            );
            push_line(
                &mut text,
                format_args!("http.timeout_secs: {}", config.http.timeout_secs),
            );
            push_line(
                &mut text,
                format_args!("http.user_agent: {}", config.http.user_agent),
            );
            push_line(
                &mut text,
                format_args!("telemetry.level: {}", config.telemetry.level),
            );
            push_line(
                &mut text,
                format_args!(
                    "telemetry.log_format: {}",
                    config.telemetry.log_format.as_deref().unwrap_or("<inferred>")
                ),
            );
            Ok(text.trim_end().to_string())
        }
    }
}

#[derive(Serialize)]
struct NameView<'a> {
    channel_id: &'a str,
    ts: &'a str,
    thread_ts: Option<&'a str>,
    file_name: String,
}

pub(crate) fn format_name(link: &SlackUrl, format: OutputFormat) -> CliResult<String> {
    let file_name = link.file_name().to_string();
    match format {
        OutputFormat::Json => to_json(&NameView {
            channel_id: &link.channel_id,
            ts: &link.ts,
            thread_ts: link.thread_ts.as_deref(),
            file_name,
        }),
        OutputFormat::Table => Ok(file_name),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

fn push_line(text: &mut String, line: fmt::Arguments<'_>) {
    let _ = text.write_fmt(line);
    text.push('\n');
}
