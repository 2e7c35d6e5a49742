//! Command implementations.

pub mod events;
pub mod grid;
pub mod server;
pub mod status;

use std::time::Duration;

use calgrid_protocol::Response;

use crate::cli::Cli;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::socket::SocketClient;

/// Builds a socket client from CLI flags and configuration.
///
/// Precedence: CLI flag, then config file, then the daemon default.
pub(crate) fn connect(cli: &Cli, config: &ClientConfig) -> SocketClient {
    let socket_path = cli
        .socket_path
        .clone()
        .or_else(|| config.server.socket_path.clone())
        .unwrap_or_else(calgrid_server::default_socket_path);
    let timeout = Duration::from_secs(cli.timeout.unwrap_or(config.server.timeout_secs));
    SocketClient::new(socket_path, timeout)
}

/// Maps a response the command cannot act on to a protocol error.
pub(crate) fn unexpected(response: Response) -> ClientError {
    ClientError::Protocol(format!("unexpected response: {response:?}"))
}

/// Prints a value as pretty JSON.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> ClientResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ClientError::Protocol(format!("failed to encode output: {e}")))?;
    println!("{json}");
    Ok(())
}
