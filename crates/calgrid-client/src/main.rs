//! calgrid CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use calgrid_client::cli::{Cli, Command};
use calgrid_client::commands::{events, grid, server, status};
use calgrid_client::config::ClientConfig;
use calgrid_client::error::ClientResult;
use calgrid_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if matches!(cli.command, Command::Serve) {
        TracingConfig::daemon()
    } else if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::default()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load().unwrap_or_default(),
    };

    match &cli.command {
        Command::Add {
            title,
            start,
            end,
            color,
            description,
        } => {
            events::add(
                &cli,
                &config,
                title.clone(),
                *start,
                *end,
                color.clone(),
                description.clone(),
            )
            .await
        }
        Command::List { from, to } => events::list(&cli, &config, *from, *to).await,
        Command::Show { id } => events::show(&cli, &config, id.clone()).await,
        Command::Edit {
            id,
            title,
            start,
            end,
            color,
            description,
        } => {
            events::edit(
                &cli,
                &config,
                id.clone(),
                title.clone(),
                *start,
                *end,
                color.clone(),
                description.clone(),
            )
            .await
        }
        Command::Rm { id } => events::remove(&cli, &config, id.clone()).await,
        Command::Grid {
            year,
            month,
            selected,
            limit,
        } => grid::show(&cli, &config, *year, *month, *selected, *limit).await,
        Command::Status => status::status(&cli, &config).await,
        Command::Ping => status::ping(&cli, &config).await,
        Command::Stop => status::stop(&cli, &config).await,
        Command::Serve => server::run(&cli, &config).await,
    }
}
