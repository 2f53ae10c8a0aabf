#![deny(unsafe_code)]

//! blinkd core runtime.
//!
//! Drives a single GPIO-connected indicator LED into one of three modes
//! (on, off, blinking) and exposes that control over a Unix domain socket.
//! The daemon is a single event loop: control requests, termination signals,
//! and blink timing are all serviced from one bounded poll, so the LED state
//! has exactly one writer and needs no locking.

/// Deployment artifact rendering (access policy and service unit).
pub mod artifacts;
/// Compile-time build metadata (version, git hash, profile).
pub mod build_info;
/// Daemon event loop and control-request plumbing.
pub mod daemon;
/// GPIO character-device line access.
pub mod gpio;
/// Control endpoint — Unix domain socket transport for the CLI.
pub mod ipc;
/// LED mode state machine and blink clock.
pub mod led;

pub use daemon::{ControlRequest, Daemon, ShutdownSignal};
pub use gpio::{CdevLine, LedLine};
pub use ipc::IpcClient;
pub use led::{LedAction, LedState};
