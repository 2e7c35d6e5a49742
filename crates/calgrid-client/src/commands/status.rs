//! Daemon status and liveness commands.

use calgrid_protocol::{Request, Response};

use super::{connect, print_json, unexpected};
use crate::cli::Cli;
use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Shows daemon status.
pub async fn status(cli: &Cli, config: &ClientConfig) -> ClientResult<()> {
    match connect(cli, config).send(Request::Status).await? {
        Response::Status { info } => {
            if cli.json {
                print_json(&info)
            } else {
                println!("uptime:  {}s", info.uptime_seconds);
                println!("events:  {}", info.event_count);
                if let Some(at) = info.last_modified {
                    println!("changed: {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
                }
                Ok(())
            }
        }
        Response::Error { error } => Err(error.into()),
        other => Err(unexpected(other)),
    }
}

/// Checks daemon liveness.
pub async fn ping(cli: &Cli, config: &ClientConfig) -> ClientResult<()> {
    match connect(cli, config).send(Request::Ping).await? {
        Response::Pong => {
            println!("pong");
            Ok(())
        }
        Response::Error { error } => Err(error.into()),
        other => Err(unexpected(other)),
    }
}

/// Asks the daemon to shut down.
pub async fn stop(cli: &Cli, config: &ClientConfig) -> ClientResult<()> {
    match connect(cli, config).send(Request::Shutdown).await? {
        Response::Ok => {
            println!("shutdown requested");
            Ok(())
        }
        Response::Error { error } => Err(error.into()),
        other => Err(unexpected(other)),
    }
}
