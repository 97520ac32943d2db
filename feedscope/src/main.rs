//! Feedscope CLI
//!
//! Command-line interface for working with Feedbin API content.

use clap::Parser;
use feedscope::cli::{dispatch, Cli, Session};
use feedscope::config::Settings;
use feedscope::format::format_error;
use feedscope::logging;
use feedscope::prompt::TerminalPrompt;
use feedscope_core::{FeedscopeError, EXIT_FAILURE};
use std::io::IsTerminal;

fn settings(cli: &Cli) -> anyhow::Result<Settings> {
    // Priority chain: defaults → file → env → CLI args
    let mut builder = Settings::builder().with_config_file()?.with_env_overrides();

    if let Some(ref url) = cli.api_url {
        builder = builder.with_api_url(url)?;
    }
    if cli.no_cache {
        builder = builder.with_cache(false);
    }

    builder.build()
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.log_config.as_deref()) {
        let path = cli
            .log_config
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        eprintln!("Failed to configure logging from {}: {}", path, e);
        std::process::exit(EXIT_FAILURE);
    }

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let settings = match settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", format_error(&format!("Configuration error: {:#}", e)));
            std::process::exit(EXIT_FAILURE);
        }
    };
    tracing::debug!("API endpoint: {}", settings.api_url);

    let prompt = TerminalPrompt;
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let result = {
        let mut session = Session::new(settings, &prompt, &mut stdout, &mut stderr);
        dispatch(cli.command, &mut session).await
    };

    if let Err(e) = result {
        let code = e
            .chain()
            .find_map(|cause| cause.downcast_ref::<FeedscopeError>())
            .map(FeedscopeError::exit_code)
            .unwrap_or(EXIT_FAILURE);

        tracing::debug!("Command failed: {:?}", e);
        eprintln!("{}", format_error(&format!("{:#}", e)));
        std::process::exit(code);
    }
}
