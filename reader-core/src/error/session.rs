use crate::error::invoker::InvokerError;

use common::{ErrorLocation, ModelError};

use thiserror::Error as ThisError;

/// Failures raised by the session state machine.
///
/// `Prerequisite` is a local guard violation - a caller logic bug that is
/// never forwarded to the remote service and never retried automatically.
/// `Validation` is malformed input rejected before any network call.
#[derive(Debug, ThisError)]
pub enum SessionError {
    #[error("Prerequisite Error: {message} {location}")]
    Prerequisite {
        message: String,
        location: ErrorLocation,
    },

    #[error("Validation Error: {message} {location}")]
    Validation {
        message: String,
        location: ErrorLocation,
    },

    #[error(transparent)]
    Invoker(#[from] InvokerError),
}

impl From<ModelError> for SessionError {
    fn from(error: ModelError) -> Self {
        match error {
            ModelError::Validation { message, location } => {
                SessionError::Validation { message, location }
            }
        }
    }
}
