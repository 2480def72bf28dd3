//! Error types
//!
//! Only startup and configuration can fail. The simulation itself recovers
//! locally from bad gestures and generator stalls.

use thiserror::Error;

/// Host environment failure. Fatal: reported once, never retried.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("no global window object")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("no <canvas> element found")]
    NoCanvas,
    #[error("canvas has no 2d rendering context")]
    NoContext2d,
    #[error("failed to attach event listener: {0}")]
    Listener(String),
    #[error("failed to schedule animation frame: {0}")]
    FrameScheduling(String),
    #[error("invalid tuning: {0}")]
    Tuning(#[from] TuningError),
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
}

/// Rejected tuning configuration
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("malformed tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("`{field}` {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}
