use crate::error::channel::ChannelError;

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

/// Failures issuing a single remote command.
///
/// `RemoteRejected` carries the service's refusal reason verbatim (device
/// busy, lock not held, invalid format, lock held by another client).
/// `Timeout` means the outcome is unknown; callers must reconnect or
/// inspect device state before retrying, because commands are not
/// idempotent on the physical instrument.
#[derive(Debug, ThisError)]
pub enum InvokerError {
    #[error("Connectivity Error: {message} {location}")]
    Connectivity {
        message: String,
        location: ErrorLocation,
    },

    #[error("Remote Rejected Error: {message} {location}")]
    RemoteRejected {
        message: String,
        location: ErrorLocation,
    },

    #[error("Timeout Error: {message} {location}")]
    Timeout {
        message: String,
        location: ErrorLocation,
    },

    #[error("Validation Error: {message} {location}")]
    Validation {
        message: String,
        location: ErrorLocation,
    },
}

impl From<reqwest::Error> for InvokerError {
    #[track_caller]
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            InvokerError::Timeout {
                message: error.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        } else {
            InvokerError::Connectivity {
                message: error.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        }
    }
}

impl From<url::ParseError> for InvokerError {
    #[track_caller]
    fn from(error: url::ParseError) -> Self {
        InvokerError::Validation {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ChannelError> for InvokerError {
    #[track_caller]
    fn from(error: ChannelError) -> Self {
        match error {
            ChannelError::UrlParse { message, location } => {
                InvokerError::Validation { message, location }
            }
            other => InvokerError::Connectivity {
                message: other.to_string(),
                location: ErrorLocation::from(Location::caller()),
            },
        }
    }
}
