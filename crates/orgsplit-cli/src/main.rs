//! orgsplit - tools for pre and post Dashboard organization split.
//!
//! Entry point for the CLI application.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use orgsplit_cli::prompt::read_api_key;
use orgsplit_cli::{dispatch, AssumeYes, Cli, CliError, Prompter, TerminalPrompter};
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_logging(cli.debug) {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Cancelled) => {
            println!("{}", CliError::Cancelled.to_string().yellow());
            ExitCode::from(CliError::Cancelled.exit_code())
        }
        Err(e) => {
            error!("{e}");
            eprintln!("{}", format!("Error: {e}").red().bold());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    let api_key = match cli.command.api_key() {
        Some(key) => key.to_string(),
        None => read_api_key()?,
    };

    let prompter: &dyn Prompter = if cli.yes {
        debug!("Assuming yes at every confirmation prompt");
        &AssumeYes
    } else {
        &TerminalPrompter
    };

    dispatch(cli, &api_key, prompter).await
}

fn setup_logging(debug: bool) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if debug => EnvFilter::new("orgsplit=debug,orgsplit_dashboard=debug,info"),
        Err(_) => EnvFilter::new("orgsplit=info,warn"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))?;

    Ok(())
}
