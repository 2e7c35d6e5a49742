//! Serve command — runs the daemon in the foreground.
//!
//! Blocks until a shutdown is requested, either by an interrupt (ctrl-c)
//! or by a client sending the Shutdown request over IPC.

use std::time::Duration;

use tracing::info;

use calgrid_server::{ServerConfig, SocketServer, make_connection_handler, new_shared_state};

use crate::cli::Cli;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Starts the server daemon in the foreground.
pub async fn run(cli: &Cli, config: &ClientConfig) -> ClientResult<()> {
    let socket_path = cli
        .socket_path
        .clone()
        .or_else(|| config.server.socket_path.clone())
        .unwrap_or_else(calgrid_server::default_socket_path);

    let server = SocketServer::new(ServerConfig::new(socket_path))
        .await
        .map_err(|e| ClientError::Daemon(e.to_string()))?;
    info!(path = %server.socket_path().display(), "calgrid daemon starting");

    let state = new_shared_state();
    let handler = make_connection_handler(state.clone());

    let shutdown_state = state.clone();
    let shutdown = async move {
        let ipc_shutdown = async {
            let mut interval = tokio::time::interval(Duration::from_millis(250));
            loop {
                interval.tick().await;
                if shutdown_state.read().await.shutdown_requested() {
                    break;
                }
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("interrupt received"),
            _ = ipc_shutdown => info!("shutdown requested over IPC"),
        }
    };

    server
        .run_until_shutdown(handler, shutdown)
        .await
        .map_err(|e| ClientError::Daemon(e.to_string()))?;

    info!("calgrid daemon stopped");
    Ok(())
}
