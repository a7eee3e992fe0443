//! Argument parsing and command dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use slackvault_config::{ConfigOverrides, TrashMode};
use slackvault_telemetry::with_run_context;
use uuid::Uuid;

use crate::client::{CliResult, init_telemetry, load_app_config};
use crate::commands::{config::handle_config_check, name::handle_name, save::handle_save};

/// Parses CLI arguments and executes the requested command. Returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let command_name = command_label(&cli.command);
    let run_id = Uuid::new_v4().to_string();

    match with_run_context(run_id, command_name, dispatch(cli)).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli) -> CliResult<()> {
    let Cli {
        config,
        vault,
        log_level,
        output,
        command,
    } = cli;
    let mut overrides = ConfigOverrides {
        vault_root: vault,
        log_level,
        ..ConfigOverrides::default()
    };

    match command {
        Command::Save(args) => {
            args.apply(&mut overrides);
            let app_config = load_app_config(config.as_deref(), overrides)?;
            init_telemetry(&app_config.telemetry)?;
            handle_save(&app_config, args, output).await
        }
        Command::Config(ConfigCommand::Check) => {
            let app_config = load_app_config(config.as_deref(), overrides)?;
            handle_config_check(&app_config, output)
        }
        Command::Name(args) => handle_name(&args, output),
    }
}

pub(crate) const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Save(_) => "save",
        Command::Config(ConfigCommand::Check) => "config_check",
        Command::Name(_) => "name",
    }
}

#[derive(Parser)]
#[command(
    name = "slackvault",
    about = "Save fetched Slack conversations into a notes vault"
)]
pub(crate) struct Cli {
    /// Configuration file (JSON).
    #[arg(long, global = true, env = "SLACKVAULT_CONFIG")]
    pub(crate) config: Option<PathBuf>,
    /// Vault directory; overrides `vault.root` from the configuration file.
    #[arg(long, global = true, env = "SLACKVAULT_VAULT")]
    pub(crate) vault: Option<PathBuf>,
    /// Default log level when `RUST_LOG` is unset.
    #[arg(long, global = true, env = "SLACKVAULT_LOG_LEVEL")]
    pub(crate) log_level: Option<String>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table
    )]
    pub(crate) output: OutputFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Persist a fetched conversation result and its attachments.
    Save(SaveArgs),
    /// Inspect the effective configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Derive the record file name from a Slack message link.
    Name(NameArgs),
}

#[derive(Subcommand)]
pub(crate) enum ConfigCommand {
    /// Validate the configuration and print the effective values.
    Check,
}

#[derive(Args, Debug)]
pub(crate) struct SaveArgs {
    /// Fetched result JSON; `-` reads standard input.
    #[arg(long, short = 'i', default_value = "-")]
    pub(crate) input: String,
    /// Session cookie (`xoxd-…`) used for attachment downloads.
    #[arg(long, env = "SLACKVAULT_COOKIE", hide_env_values = true)]
    pub(crate) cookie: Option<String>,
    /// Bearer token the result was fetched with.
    #[arg(long, env = "SLACKVAULT_TOKEN", hide_env_values = true)]
    pub(crate) token: Option<String>,
    /// Attachment folder that wins over the vault's own setting.
    #[arg(long)]
    pub(crate) attachment_folder: Option<String>,
    /// Where replaced files go (`local` or `system`).
    #[arg(long, value_parser = parse_trash_mode)]
    pub(crate) trash_mode: Option<TrashMode>,
    /// Attachment download timeout in seconds.
    #[arg(long = "timeout", env = "SLACKVAULT_HTTP_TIMEOUT_SECS")]
    pub(crate) timeout_secs: Option<u64>,
    /// Command that receives the file name on stdin, e.g. `pbcopy`.
    #[arg(long, env = "SLACKVAULT_CLIPBOARD_COMMAND")]
    pub(crate) clipboard_command: Option<String>,
}

impl SaveArgs {
    fn apply(&self, overrides: &mut ConfigOverrides) {
        overrides.attachment_folder.clone_from(&self.attachment_folder);
        overrides.trash_mode = self.trash_mode;
        overrides.timeout_secs = self.timeout_secs;
    }
}

#[derive(Args, Debug)]
pub(crate) struct NameArgs {
    /// Message permalink, e.g. `https://team.slack.com/archives/C123/p1700000000123456`.
    pub(crate) url: String,
}

#[derive(Copy, Clone, Debug, Default, ValueEnum, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

fn parse_trash_mode(value: &str) -> Result<TrashMode, String> {
    value.parse::<TrashMode>().map_err(|err| err.detail())
}
