use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

/// Failures establishing a channel to the remote instrument service.
#[derive(Debug, ThisError)]
pub enum ChannelError {
    #[error("Connect Error: {message} {location}")]
    Connect {
        message: String,
        location: ErrorLocation,
    },

    #[error("TLS Error: {message} {location}")]
    Tls {
        message: String,
        location: ErrorLocation,
    },

    #[error("URL Parse Error: {message} {location}")]
    UrlParse {
        message: String,
        location: ErrorLocation,
    },
}

impl From<url::ParseError> for ChannelError {
    #[track_caller]
    fn from(error: url::ParseError) -> Self {
        ChannelError::UrlParse {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
