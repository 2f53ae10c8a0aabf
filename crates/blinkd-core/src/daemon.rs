//! Daemon event loop and control-request plumbing.
//!
//! One thread, one loop: the daemon waits on a bounded tick, the control
//! channel, and the termination signals with a single `select!`, drains
//! every queued control request, then reconciles the LED line against the
//! state machine. Termination is observed as readiness, in the same place
//! as everything else, so the final iteration always completes before
//! shutdown.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use blinkd_config::AppConfig;

use crate::gpio::{GpioError, LedLine};
use crate::ipc::server::{self, IpcState};
use crate::led::{LedAction, LedState};

/// Shutdown signal sent via broadcast channel.
#[derive(Debug, Clone)]
pub struct ShutdownSignal;

/// A control operation forwarded from the endpoint to the event loop.
///
/// Handlers never touch LED state themselves; they enqueue one of these
/// and await the reply, so every mutation happens on the loop.
#[derive(Debug)]
pub enum ControlRequest {
    /// Change the LED mode. Replies `false` for an unrecognized action,
    /// leaving the current mode untouched.
    Set {
        action: String,
        reply: oneshot::Sender<bool>,
    },

    /// Report the current LED mode as its wire string.
    Get { reply: oneshot::Sender<&'static str> },
}

/// Errors from the daemon runtime.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("failed to register signal source: {0}")]
    Signal(std::io::Error),

    #[error("failed to bind control socket: {0}")]
    Bind(std::io::Error),

    #[error(transparent)]
    Gpio(#[from] GpioError),

    #[error("control endpoint failed: {0}")]
    Ipc(std::io::Error),

    #[error("control endpoint task failed: {0}")]
    IpcJoin(tokio::task::JoinError),
}

/// The blinkd daemon: owns the LED state machine and the control channel.
pub struct Daemon {
    config: AppConfig,
    state: LedState,
    control_tx: mpsc::Sender<ControlRequest>,
    control_rx: mpsc::Receiver<ControlRequest>,
    shutdown_tx: broadcast::Sender<ShutdownSignal>,
}

impl Daemon {
    /// Create a daemon instance with the given configuration.
    /// The LED starts in the `Off` mode.
    pub fn new(config: AppConfig) -> Self {
        let (control_tx, control_rx) = mpsc::channel(64);
        let (shutdown_tx, _) = broadcast::channel(1);
        let blink_interval = Duration::from_millis(config.daemon.blink_interval_ms);

        Self {
            config,
            state: LedState::new(blink_interval),
            control_tx,
            control_rx,
            shutdown_tx,
        }
    }

    /// Sender half of the control channel, used by the endpoint handlers
    /// and by tests driving the loop directly.
    pub fn control_sender(&self) -> mpsc::Sender<ControlRequest> {
        self.control_tx.clone()
    }

    /// Handle that requests a graceful shutdown, equivalent to SIGTERM.
    pub fn shutdown_handle(&self) -> broadcast::Sender<ShutdownSignal> {
        self.shutdown_tx.clone()
    }

    /// Get a reference to the daemon's configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run the event loop on the given line until termination is requested.
    ///
    /// Acquiring the socket or the signal sources fails before the loop is
    /// entered; any steady-state GPIO or IPC failure is fatal and
    /// propagates out. On a clean exit the LED is driven low, the line
    /// released, and the control socket withdrawn.
    pub async fn run<L: LedLine>(mut self, mut line: L) -> Result<(), DaemonError> {
        let mut sigterm = signal(SignalKind::terminate()).map_err(DaemonError::Signal)?;
        let mut sigint = signal(SignalKind::interrupt()).map_err(DaemonError::Signal)?;

        let socket_path = server::socket_path_from_config(&self.config);
        let listener = server::bind(&socket_path).map_err(DaemonError::Bind)?;
        info!(
            service = %self.config.endpoint.service_name,
            object = %self.config.endpoint.object_path,
            socket = %socket_path.display(),
            "control endpoint registered"
        );

        let state = Arc::new(IpcState {
            control: self.control_tx.clone(),
        });
        // The endpoint stops on its own channel, signalled only after the
        // loop has exited, so a shutdown request never races the
        // endpoint-failure arm below.
        let (endpoint_stop, _) = broadcast::channel::<ShutdownSignal>(1);
        let mut endpoint = tokio::spawn(server::serve(
            listener,
            state,
            self.config.endpoint.object_path.clone(),
            endpoint_stop.subscribe(),
        ));

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let poll_timeout = Duration::from_millis(self.config.daemon.poll_timeout_ms);
        let mut tick = tokio::time::interval(poll_timeout);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("daemon ready");

        let mut exit_requested = false;
        while !exit_requested {
            // Bounded wait; whichever source wakes us, the rest of the
            // iteration still runs.
            tokio::select! {
                _ = tick.tick() => {}
                _ = sigterm.recv() => {
                    info!("SIGTERM received");
                    exit_requested = true;
                }
                _ = sigint.recv() => {
                    info!("SIGINT received");
                    exit_requested = true;
                }
                _ = shutdown_rx.recv() => {
                    info!("shutdown requested");
                    exit_requested = true;
                }
                req = self.control_rx.recv() => {
                    if let Some(req) = req {
                        apply_control(&mut self.state, req);
                    }
                }
                res = &mut endpoint => {
                    return Err(endpoint_failure(res));
                }
            }

            // Answer everything already queued, so caller latency stays
            // bounded to one poll cycle rather than one call per cycle.
            while let Ok(req) = self.control_rx.try_recv() {
                apply_control(&mut self.state, req);
            }

            sync_line(&self.state, &mut line, SystemTime::now())?;
        }

        line.set(false)?;
        drop(line);

        let _ = endpoint_stop.send(ShutdownSignal);
        match endpoint.await {
            Ok(result) => result.map_err(DaemonError::Ipc)?,
            Err(e) => return Err(DaemonError::IpcJoin(e)),
        }

        info!("exit");
        Ok(())
    }
}

/// Apply one drained control request to the state machine and answer it.
pub fn apply_control(state: &mut LedState, req: ControlRequest) {
    match req {
        ControlRequest::Set { action, reply } => {
            let accepted = match LedAction::parse(&action) {
                Some(action) => {
                    info!(%action, "LED mode set");
                    state.set_action(action);
                    true
                }
                None => {
                    warn!(action = %action, "unrecognized action rejected");
                    false
                }
            };
            let _ = reply.send(accepted);
        }
        ControlRequest::Get { reply } => {
            let _ = reply.send(state.action().as_str());
        }
    }
}

/// Reconcile the line with the expected level, writing only on change.
pub fn sync_line<L: LedLine>(
    state: &LedState,
    line: &mut L,
    now: SystemTime,
) -> Result<(), GpioError> {
    let expected = state.expected_level(now);
    if line.get()? != expected {
        line.set(expected)?;
    }
    Ok(())
}

fn endpoint_failure(
    res: Result<Result<(), std::io::Error>, tokio::task::JoinError>,
) -> DaemonError {
    match res {
        Ok(Ok(())) => DaemonError::Ipc(std::io::Error::other(
            "control endpoint exited before shutdown",
        )),
        Ok(Err(e)) => DaemonError::Ipc(e),
        Err(e) => DaemonError::IpcJoin(e),
    }
}
