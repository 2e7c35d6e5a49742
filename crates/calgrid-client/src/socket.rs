//! Unix socket client for communicating with the calgrid daemon.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tracing::{debug, warn};
use uuid::Uuid;

use calgrid_protocol::{Envelope, MAX_MESSAGE_SIZE, Request, Response};

use crate::error::{ClientError, ClientResult};

/// Client for communicating with the calgrid server over a Unix socket.
pub struct SocketClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl SocketClient {
    /// Creates a new socket client.
    pub fn new(socket_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            socket_path: socket_path.into(),
            timeout,
        }
    }

    /// Creates a socket client with the default socket path.
    pub fn with_defaults() -> Self {
        Self::new(calgrid_server::default_socket_path(), Duration::from_secs(5))
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Checks if the server socket exists.
    pub fn socket_exists(&self) -> bool {
        self.socket_path.exists()
    }

    /// Sends a request and waits for the correlated response.
    pub async fn send(&self, request: Request) -> ClientResult<Response> {
        let request_id = Uuid::new_v4().to_string();
        let envelope = Envelope::request(&request_id, request);

        debug!(
            socket = %self.socket_path.display(),
            request_id = %request_id,
            "connecting to server"
        );

        let stream = tokio::time::timeout(self.timeout, UnixStream::connect(&self.socket_path))
            .await
            .map_err(|_| {
                ClientError::Connection(format!(
                    "connection timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                ClientError::Connection(format!(
                    "failed to connect to {}: {}",
                    self.socket_path.display(),
                    e
                ))
            })?;

        let response = self.exchange(stream, &envelope).await?;

        if response.request_id != request_id {
            warn!(
                expected = %request_id,
                received = %response.request_id,
                "response request_id mismatch"
            );
        }

        Ok(response.payload)
    }

    /// Performs the framed request-response exchange on a connected stream.
    async fn exchange(
        &self,
        mut stream: UnixStream,
        envelope: &Envelope<Request>,
    ) -> ClientResult<Envelope<Response>> {
        let json = serde_json::to_vec(envelope)
            .map_err(|e| ClientError::Protocol(format!("failed to serialize request: {e}")))?;

        let len = json.len() as u32;
        if len > MAX_MESSAGE_SIZE {
            return Err(ClientError::Protocol(format!(
                "request too large: {len} bytes (max: {MAX_MESSAGE_SIZE})"
            )));
        }

        tokio::time::timeout(self.timeout, async {
            stream.write_all(&len.to_be_bytes()).await?;
            stream.write_all(&json).await?;
            stream.flush().await?;
            Ok::<(), std::io::Error>(())
        })
        .await
        .map_err(|_| ClientError::Timeout("sending request".into()))?
        .map_err(ClientError::Io)?;

        debug!("request sent, waiting for response");

        let payload = tokio::time::timeout(self.timeout, async {
            let mut len_buf = [0u8; 4];
            stream.read_exact(&mut len_buf).await?;
            let resp_len = u32::from_be_bytes(len_buf);

            if resp_len > MAX_MESSAGE_SIZE {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("response too large: {resp_len} bytes (max: {MAX_MESSAGE_SIZE})"),
                ));
            }

            let mut payload = vec![0u8; resp_len as usize];
            stream.read_exact(&mut payload).await?;
            Ok::<Vec<u8>, std::io::Error>(payload)
        })
        .await
        .map_err(|_| ClientError::Timeout("waiting for response".into()))?
        .map_err(ClientError::Io)?;

        serde_json::from_slice(&payload)
            .map_err(|e| ClientError::Protocol(format!("failed to parse response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path as StdPath;

    use chrono::TimeZone;
    use tokio::task::JoinHandle;

    use calgrid_protocol::{ErrorCode, EventDraft};
    use calgrid_server::{ServerConfig, SocketServer, make_connection_handler, new_shared_state};

    async fn spawn_server(socket_path: &StdPath) -> JoinHandle<()> {
        let server = SocketServer::new(ServerConfig::new(socket_path))
            .await
            .expect("bind test socket");
        let state = new_shared_state();
        tokio::spawn(async move {
            let _ = server.run(make_connection_handler(state)).await;
        })
    }

    fn draft(title: &str) -> EventDraft {
        EventDraft::new(
            title,
            chrono::Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap(),
            chrono::Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn ping_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("calgrid.sock");
        let server = spawn_server(&socket_path).await;

        let client = SocketClient::new(&socket_path, Duration::from_secs(2));
        assert!(client.socket_exists());

        let response = client.send(Request::Ping).await.unwrap();
        assert_eq!(response, Response::Pong);

        server.abort();
    }

    #[tokio::test]
    async fn crud_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("calgrid.sock");
        let server = spawn_server(&socket_path).await;

        let client = SocketClient::new(&socket_path, Duration::from_secs(2));

        // Create
        let created = match client
            .send(Request::create_event(draft("Team Standup")))
            .await
            .unwrap()
        {
            Response::Event { event } => event,
            other => panic!("expected Event response, got {other:?}"),
        };

        // Grid for the event's month shows it
        match client.send(Request::month_grid(2024, 3)).await.unwrap() {
            Response::Grid { grid } => {
                let total: usize = grid.cells().iter().map(|c| c.total_events()).sum();
                assert_eq!(total, 1);
            }
            other => panic!("expected Grid response, got {other:?}"),
        }

        // Delete, then it is gone
        assert_eq!(
            client
                .send(Request::delete_event(&created.id))
                .await
                .unwrap(),
            Response::Ok
        );
        match client.send(Request::get_event(&created.id)).await.unwrap() {
            Response::Error { error } => assert_eq!(error.code, ErrorCode::NotFound),
            other => panic!("expected Error response, got {other:?}"),
        }

        server.abort();
    }

    #[tokio::test]
    async fn connection_error_without_server() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("missing.sock");

        let client = SocketClient::new(&socket_path, Duration::from_millis(200));
        assert!(!client.socket_exists());

        let result = client.send(Request::Ping).await;
        assert!(matches!(result, Err(ClientError::Connection(_))));
    }
}
