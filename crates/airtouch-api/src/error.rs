//! Error types reported by the console

use thiserror::Error;

use crate::{AcFanSpeed, AcMode};

/// Result type for console requests
pub type AirTouchResult<T> = Result<T, AirTouchError>;

/// Errors that can occur when sending a request to a console
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AirTouchError {
    /// The console connection is not established
    #[error("not connected to the AirTouch console")]
    NotConnected,

    /// The console did not acknowledge the request in time
    #[error("timed out waiting for the AirTouch console")]
    Timeout,

    /// The console refused the request
    #[error("request rejected by the AirTouch console: {0}")]
    Rejected(String),

    /// The unit does not support the requested mode
    #[error("air conditioner does not support mode {0:?}")]
    UnsupportedMode(AcMode),

    /// The unit does not support the requested fan speed
    #[error("air conditioner does not support fan speed {0:?}")]
    UnsupportedFanSpeed(AcFanSpeed),
}
