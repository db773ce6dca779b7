use crate::error::model_error::ModelError;
use crate::{ErrorLocation, InstrumentInfo};

use std::panic::Location;

use url::Url;

/// Builder for creating validated [`InstrumentInfo`] instances.
#[derive(Debug, Default)]
pub struct InstrumentInfoBuilder {
    pid: Option<u32>,
    port: Option<u16>,
    base_url: Option<String>,
    name: Option<String>,
    command: Option<String>,
    owned: Option<bool>,
}

impl InstrumentInfoBuilder {
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_command(mut self, cmd: impl Into<String>) -> Self {
        self.command = Some(cmd.into());
        self
    }

    pub fn with_owned(mut self, owned: bool) -> Self {
        self.owned = Some(owned);
        self
    }

    /// Build the InstrumentInfo with validation.
    #[track_caller]
    pub fn build(self) -> Result<InstrumentInfo, ModelError> {
        let pid = self.pid.ok_or_else(|| ModelError::Validation {
            message: String::from("PID is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if pid == 0 {
            return Err(ModelError::Validation {
                message: String::from("PID must be non-zero"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let port = self.port.ok_or_else(|| ModelError::Validation {
            message: String::from("Port is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if port == 0 {
            return Err(ModelError::Validation {
                message: String::from("Port must be non-zero (the service always binds a port)"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let base_url = self.base_url.ok_or_else(|| ModelError::Validation {
            message: String::from("Base URL is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let parsed = Url::parse(&base_url).map_err(|e| ModelError::Validation {
            message: format!("Invalid base URL '{base_url}': {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ModelError::Validation {
                message: format!(
                    "Base URL must be http(s), got '{}' in '{base_url}'",
                    parsed.scheme()
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        // The base URL is what clients dial; it must name the same port the
        // service was observed (or told) to bind.
        if let Some(url_port) = parsed.port_or_known_default()
            && url_port != port
        {
            return Err(ModelError::Validation {
                message: format!(
                    "Base URL '{base_url}' names port {url_port}, but the service port is {port}"
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let name = self.name.ok_or_else(|| ModelError::Validation {
            message: String::from("Application name is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if name.is_empty() {
            return Err(ModelError::Validation {
                message: String::from("Application name cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let command = self.command.ok_or_else(|| ModelError::Validation {
            message: String::from("Command is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let owned = self.owned.ok_or_else(|| ModelError::Validation {
            message: String::from("Owned is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(InstrumentInfo {
            pid,
            port,
            base_url,
            name,
            command,
            owned,
        })
    }
}
