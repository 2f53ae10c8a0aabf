//! LED mode state machine and blink clock.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// The requested LED mode.
///
/// Serialized on the wire as the case-sensitive strings `"on"`, `"off"`,
/// and `"blink"`; anything else is rejected at the control endpoint
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedAction {
    On,
    Off,
    Blink,
}

impl LedAction {
    /// Parse an exact wire string. Returns `None` for anything that is not
    /// `"on"`, `"off"`, or `"blink"`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "on" => Some(LedAction::On),
            "off" => Some(LedAction::Off),
            "blink" => Some(LedAction::Blink),
            _ => None,
        }
    }

    /// The wire string for this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            LedAction::On => "on",
            LedAction::Off => "off",
            LedAction::Blink => "blink",
        }
    }
}

impl std::fmt::Display for LedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Blink square wave, phase-locked to wall-clock time.
///
/// High whenever an even number of whole intervals has elapsed since the
/// Unix epoch. Deriving the phase from absolute time rather than daemon
/// start time keeps restarts and multiple instances visually synchronized.
pub fn blink_level(now: SystemTime, interval: Duration) -> bool {
    let since_epoch = now.duration_since(UNIX_EPOCH).unwrap_or_default();
    (since_epoch.as_millis() / interval.as_millis().max(1)) % 2 == 0
}

/// Current LED mode plus the blink interval.
///
/// Owned by the daemon event loop; all mutation happens there, on a single
/// thread, when queued control requests are drained.
#[derive(Debug, Clone)]
pub struct LedState {
    action: LedAction,
    blink_interval: Duration,
}

impl LedState {
    /// A state machine in the initial `Off` mode.
    pub fn new(blink_interval: Duration) -> Self {
        Self {
            action: LedAction::Off,
            blink_interval,
        }
    }

    /// Switch to a new mode.
    pub fn set_action(&mut self, action: LedAction) {
        self.action = action;
    }

    /// The current mode.
    pub fn action(&self) -> LedAction {
        self.action
    }

    /// The physical level the LED should show at `now`.
    pub fn expected_level(&self, now: SystemTime) -> bool {
        match self.action {
            LedAction::On => true,
            LedAction::Off => false,
            LedAction::Blink => blink_level(now, self.blink_interval),
        }
    }
}
