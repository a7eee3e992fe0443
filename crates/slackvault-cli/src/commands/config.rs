use slackvault_config::AppConfig;

use crate::cli::OutputFormat;
use crate::client::CliResult;
use crate::output::render_config;

pub(crate) fn handle_config_check(config: &AppConfig, format: OutputFormat) -> CliResult<()> {
    render_config(config, format)
}
