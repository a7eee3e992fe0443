use slackvault_core::slack_url::SlackUrl;

use crate::cli::{NameArgs, OutputFormat};
use crate::client::{CliError, CliResult};
use crate::output::format_name;

pub(crate) fn handle_name(args: &NameArgs, format: OutputFormat) -> CliResult<()> {
    println!("{}", resolve_name(&args.url, format)?);
    Ok(())
}

fn resolve_name(url: &str, format: OutputFormat) -> CliResult<String> {
    let link = SlackUrl::parse(url.trim()).map_err(|err| CliError::validation(err.detail()))?;
    format_name(&link, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};

    #[test]
    fn plain_message_link_yields_channel_and_ts() -> Result<()> {
        let name = resolve_name(
            " https://team.slack.com/archives/D0123ABCD/p1712345678000200 ",
            OutputFormat::Table,
        )
        .map_err(|err| anyhow!(err.display_message()))?;
        assert_eq!(name, "D0123ABCD-1712345678.000200.json");
        Ok(())
    }

    #[test]
    fn malformed_link_is_a_validation_error() {
        let code = resolve_name("https://team.slack.com/archives/general", OutputFormat::Table)
            .err()
            .map(|err| err.exit_code());
        assert_eq!(code, Some(2));
    }
}
