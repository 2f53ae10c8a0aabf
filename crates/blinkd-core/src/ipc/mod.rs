//! Control endpoint — Unix domain socket transport for the CLI.
//!
//! The daemon exposes the `set`/`get` operations as an HTTP/JSON API over
//! a Unix socket, mounted at the configured object path. Handlers forward
//! every request to the event loop over a channel, so LED state keeps a
//! single writer.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐       Unix socket        ┌──────────────┐
//! │   CLI    │─────────────────────────▶│  IPC Server  │
//! │ set/get  │  HTTP/1.1 + JSON         │  (axum)      │
//! └──────────┘                          └──────┬───────┘
//!                                              │ mpsc + oneshot
//!                                       ┌──────▼───────┐
//!                                       │  Event Loop  │
//!                                       │  (LedState)  │
//!                                       └──────────────┘
//! ```

pub mod client;
pub mod server;
pub mod types;

pub use client::IpcClient;
pub use server::{DEFAULT_SOCKET_PATH, IpcState};
pub use types::*;
