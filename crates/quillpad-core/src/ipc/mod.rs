//! Daemon IPC: HTTP/JSON over a Unix domain socket.
//!
//! The daemon serves the context pipeline, the assist endpoint and its
//! shared cache. The CLI and peer processes connect as clients.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐        Unix socket       ┌──────────────┐
//! │ CLI          │─────────────────────────▶│  IPC Server  │
//! │ editor proxy │  HTTP/1.1 + JSON         │  (axum)      │
//! │ remote cache │                          └──────┬───────┘
//! └──────────────┘                                 │
//!                                    ┌─────────────┼─────────────┐
//!                                    ▼             ▼             ▼
//!                              ContextPipeline  Assistant   CacheStore
//! ```

pub mod client;
pub mod server;
pub mod types;

pub use client::{IpcClient, IpcClientError, IpcConnection};
pub use server::{DEFAULT_SOCKET_PATH, IpcState, socket_path_from_config};
pub use types::*;
