use crate::error::model_error::ModelError;
use crate::ErrorLocation;

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::panic::Location;

use serde::{Deserialize, Serialize};

/// Result export formats accepted by the instrument service.
///
/// This is a closed set. The service also offers PDF exports through its
/// GUI, but PDF is not part of the remote contract and is rejected here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Json,
    Xml,
}

impl ExportFormat {
    /// Value carried on the wire (query parameters and request bodies).
    pub fn wire_value(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Json => "json",
            ExportFormat::Xml => "xml",
        }
    }

    /// Parse a user-supplied format name (case-insensitive).
    #[track_caller]
    pub fn parse(value: &str) -> Result<Self, ModelError> {
        match value.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" => Ok(ExportFormat::Xlsx),
            "json" => Ok(ExportFormat::Json),
            "xml" => Ok(ExportFormat::Xml),
            other => Err(ModelError::Validation {
                message: format!(
                    "Unsupported export format '{other}' (expected csv, xlsx, json or xml)"
                ),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

impl Default for ExportFormat {
    fn default() -> Self {
        ExportFormat::Csv
    }
}

impl Display for ExportFormat {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(formatter, "{}", self.wire_value())
    }
}
