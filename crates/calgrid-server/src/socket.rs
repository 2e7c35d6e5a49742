//! Unix socket listener for IPC.
//!
//! Provides an async Unix socket server that handles client connections
//! using the calgrid protocol (length-prefixed JSON envelopes).

use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use calgrid_protocol::{
    Envelope, MAX_MESSAGE_SIZE, PROTOCOL_VERSION, ProtocolError, Request, Response,
};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

fn timeout_error(operation: &str) -> ServerError {
    ServerError::Protocol(ProtocolError::Timeout {
        operation: operation.to_string(),
    })
}

/// Unix socket server for handling client connections.
pub struct SocketServer {
    /// Server configuration.
    config: ServerConfig,
    /// Unix socket listener.
    listener: UnixListener,
    /// Semaphore for limiting concurrent connections.
    connection_semaphore: Arc<Semaphore>,
}

impl SocketServer {
    /// Creates a new socket server bound to the configured path.
    ///
    /// If `cleanup_stale_socket` is set, an existing socket file that no
    /// server answers on is removed before binding; a live socket is
    /// reported as [`ServerError::SocketInUse`].
    pub async fn new(config: ServerConfig) -> ServerResult<Self> {
        let socket_path = &config.socket_path;

        if let Some(parent) = socket_path.parent()
            && !parent.exists()
        {
            return Err(ServerError::socket_path_invalid(
                parent.to_string_lossy().to_string(),
            ));
        }

        if socket_path.exists() {
            if !config.cleanup_stale_socket {
                return Err(ServerError::socket_in_use(
                    socket_path.to_string_lossy().to_string(),
                ));
            }
            match UnixStream::connect(socket_path).await {
                Ok(_) => {
                    // Another server is answering on this path
                    return Err(ServerError::socket_in_use(
                        socket_path.to_string_lossy().to_string(),
                    ));
                }
                Err(_) => {
                    info!(path = %socket_path.display(), "Removing stale socket");
                    std::fs::remove_file(socket_path)?;
                }
            }
        }

        let listener = UnixListener::bind(socket_path)?;
        info!(path = %socket_path.display(), "Socket server listening");

        let connection_semaphore = Arc::new(Semaphore::new(config.max_connections));

        Ok(Self {
            config,
            listener,
            connection_semaphore,
        })
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.config.socket_path
    }

    /// Accepts a single connection.
    pub async fn accept(&self) -> ServerResult<Connection> {
        let permit = self.connection_semaphore.clone().acquire_owned().await;
        let permit = permit.expect("semaphore should not be closed");

        let (stream, _addr) = self.listener.accept().await?;
        debug!("Accepted new connection");

        Ok(Connection {
            stream,
            timeout: self.config.connection_timeout,
            _permit: permit,
        })
    }

    /// Runs the server accept loop, calling the handler for each connection.
    ///
    /// Runs indefinitely; accept errors are logged and the loop continues.
    pub async fn run<F, Fut>(&self, handler: F) -> ServerResult<()>
    where
        F: Fn(Connection) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        loop {
            match self.accept().await {
                Ok(connection) => {
                    tokio::spawn(handler(connection));
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    /// Runs the server accept loop until the shutdown future completes.
    pub async fn run_until_shutdown<F, Fut, S>(&self, handler: F, shutdown: S) -> ServerResult<()>
    where
        F: Fn(Connection) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
        S: std::future::Future<Output = ()> + Send,
    {
        tokio::select! {
            result = self.run(handler) => result,
            _ = shutdown => {
                info!("Shutdown signal received");
                Ok(())
            }
        }
    }
}

impl Drop for SocketServer {
    fn drop(&mut self) {
        if self.config.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.socket_path) {
                warn!(
                    path = %self.config.socket_path.display(),
                    error = %e,
                    "Failed to remove socket file"
                );
            } else {
                debug!(
                    path = %self.config.socket_path.display(),
                    "Removed socket file"
                );
            }
        }
    }
}

/// A client connection to the server.
pub struct Connection {
    stream: UnixStream,
    timeout: std::time::Duration,
    _permit: tokio::sync::OwnedSemaphorePermit,
}

impl Connection {
    /// Reads a request envelope from the connection.
    ///
    /// Returns `Ok(None)` if the connection was closed cleanly.
    pub async fn read_request(&mut self) -> ServerResult<Option<Envelope<Request>>> {
        // Read length prefix (4 bytes, big-endian)
        let mut len_buf = [0u8; 4];
        match tokio::time::timeout(self.timeout, self.stream.read_exact(&mut len_buf)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(timeout_error("read request length")),
        }

        let len = u32::from_be_bytes(len_buf);
        if len > MAX_MESSAGE_SIZE {
            return Err(ServerError::Protocol(ProtocolError::MessageTooLarge {
                size: len,
                max: MAX_MESSAGE_SIZE,
            }));
        }
        if len == 0 {
            return Err(ServerError::Protocol(ProtocolError::EmptyMessage));
        }

        let mut payload = vec![0u8; len as usize];
        match tokio::time::timeout(self.timeout, self.stream.read_exact(&mut payload)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(timeout_error("read request payload")),
        }

        let envelope: Envelope<Request> =
            serde_json::from_slice(&payload).map_err(ProtocolError::from)?;

        if !envelope.is_compatible() {
            warn!(
                version = %envelope.protocol_version,
                expected = %PROTOCOL_VERSION,
                "Incompatible protocol version"
            );
        }

        Ok(Some(envelope))
    }

    /// Sends a response correlated to the given request id.
    pub async fn respond(&mut self, request_id: &str, response: Response) -> ServerResult<()> {
        let envelope = Envelope::response(request_id, response);
        let json = serde_json::to_vec(&envelope).map_err(ProtocolError::from)?;

        let len = json.len() as u32;
        if len > MAX_MESSAGE_SIZE {
            return Err(ServerError::Protocol(ProtocolError::MessageTooLarge {
                size: len,
                max: MAX_MESSAGE_SIZE,
            }));
        }

        let mut buffer = Vec::with_capacity(4 + json.len());
        buffer.extend_from_slice(&len.to_be_bytes());
        buffer.extend_from_slice(&json);

        let write = async {
            self.stream.write_all(&buffer).await?;
            self.stream.flush().await
        };
        match tokio::time::timeout(self.timeout, write).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(timeout_error("write response")),
        }
    }
}
