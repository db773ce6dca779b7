use crate::error::model_error::ModelError;
use crate::ErrorLocation;

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::panic::Location;
use std::path::Path;

use serde::Serialize;
use url::Url;

const FILE_SCHEME: &str = "file";
const HTTP_SCHEME: &str = "http";
const HTTPS_SCHEME: &str = "https";

/// Location of a measurement protocol to load on the instrument.
///
/// Only `file://`, `http://` and `https://` URIs are accepted; anything
/// else is rejected locally before a remote call is attempted. The URI
/// string is preserved verbatim so platform path rules (for example
/// `file:///C:/protocols/assay.byop` on Windows) survive the round trip
/// to the service unchanged.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WorkspaceUri(String);

impl WorkspaceUri {
    /// Validate a protocol URI.
    #[track_caller]
    pub fn parse(uri: &str) -> Result<Self, ModelError> {
        let parsed = Url::parse(uri).map_err(|e| ModelError::Validation {
            message: format!("Invalid workspace URI '{uri}': {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        match parsed.scheme() {
            FILE_SCHEME | HTTP_SCHEME | HTTPS_SCHEME => Ok(Self(uri.to_string())),
            other => Err(ModelError::Validation {
                message: format!(
                    "Unsupported workspace URI scheme '{other}' in '{uri}' \
                     (expected file://, http:// or https://)"
                ),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    /// Build a `file://` URI from a local filesystem path.
    #[track_caller]
    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let url = Url::from_file_path(path).map_err(|_| ModelError::Validation {
            message: format!(
                "Cannot build a file:// URI from '{}' (path must be absolute)",
                path.display()
            ),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(Self(url.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for WorkspaceUri {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(formatter, "{}", self.0)
    }
}
