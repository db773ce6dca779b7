use common::{ErrorLocation, ModelError};

use std::error::Error as StdError;
use std::panic::Location;

use thiserror::Error as ThisError;

/// Failures launching or locating the vendor application.
#[derive(Debug, ThisError)]
pub enum LaunchError {
    #[error("Spawn Error: {message} {location}")]
    Spawn {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Query Error: {message} {location}")]
    Query {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
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

impl From<ModelError> for LaunchError {
    fn from(error: ModelError) -> Self {
        match error {
            ModelError::Validation { message, location } => {
                LaunchError::Validation { message, location }
            }
        }
    }
}

impl From<std::io::Error> for LaunchError {
    #[track_caller]
    fn from(error: std::io::Error) -> Self {
        LaunchError::Spawn {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(error),
        }
    }
}
