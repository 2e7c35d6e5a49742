//! Daemon: event store, request handler, Unix socket IPC.
//!
//! This crate provides the calgrid server daemon that handles:
//! - Unix socket IPC for client communication
//! - The in-memory event store (CRUD)
//! - Dispatch of range and month-grid queries to the scheduling engine
//!
//! # Example
//!
//! ```rust,no_run
//! use calgrid_server::{ServerConfig, SocketServer, make_connection_handler, new_shared_state};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = SocketServer::new(ServerConfig::default()).await?;
//!     let state = new_shared_state();
//!     server.run(make_connection_handler(state)).await?;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod handler;
mod socket;
mod store;

pub use config::{ServerConfig, default_socket_path};
pub use error::{ServerError, ServerResult};
pub use handler::{
    RequestHandler, ServerState, SharedState, make_connection_handler, new_shared_state,
};
pub use socket::{Connection, SocketServer};
pub use store::{EventStore, StoreError, StoreResult};
