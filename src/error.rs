//! Error types and result definitions for the sonoff-th crate.
//! Includes the device error codes reported by Sonoff LAN-mode firmware.

use thiserror::Error;

/// Represents all possible errors raised while dispatching switch commands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwitchError {
    /// JSON serialization or deserialization error
    #[error("JSON error: {0}")]
    Json(String),

    /// The mutation was not acknowledged in time
    #[error("Timeout waiting for device")]
    Timeout,

    /// The switch was stopped; no further mutations are accepted
    #[error("Switch closed")]
    Closed,

    /// Failure reported by the transport carrying the mutation
    #[error("Transport error: {0}")]
    Transport(String),

    /// The device answered with a non-zero error code
    #[error("Device error {0}")]
    Device(u32),

    /// A state that cannot be requested directly
    #[error("Invalid switch state: {0}")]
    InvalidState(String),
}

/// A specialized Result type for switch operations.
pub type Result<T> = std::result::Result<T, SwitchError>;

impl From<serde_json::Error> for SwitchError {
    fn from(err: serde_json::Error) -> Self {
        SwitchError::Json(err.to_string())
    }
}

impl SwitchError {
    pub fn code(&self) -> u32 {
        match self {
            SwitchError::Json(_) => ERR_BAD_REQUEST,
            SwitchError::Timeout => ERR_TIMEOUT,
            SwitchError::Closed => ERR_OFFLINE,
            SwitchError::Transport(_) => ERR_OFFLINE,
            SwitchError::Device(code) => *code,
            SwitchError::InvalidState(_) => ERR_INVALID_PARAMS,
        }
    }

    /// Human-readable description of the error code.
    pub fn message(&self) -> &'static str {
        get_error_message(self.code())
    }

    /// Maps a device response code to a result. Zero means success.
    pub fn check_code(code: u32) -> Result<()> {
        match code {
            ERR_SUCCESS => Ok(()),
            other => Err(SwitchError::Device(other)),
        }
    }
}

// Sonoff LAN-mode response codes, plus local ones above 900
define_error_codes! {
    ERR_SUCCESS = 0 => "Operation Successful",
    ERR_BAD_REQUEST = 400 => "Request Formatted Incorrectly",
    ERR_UNAUTHORIZED = 401 => "Request Unauthorized",
    ERR_NOT_FOUND = 404 => "Device Does Not Exist",
    ERR_INVALID_PARAMS = 422 => "Invalid Request Parameters",
    ERR_TIMEOUT = 902 => "Timeout Waiting for Device",
    ERR_OFFLINE = 905 => "Device Unreachable",
}
