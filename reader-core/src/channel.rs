//! Channel provider: opens a verified connection to the instrument service.
//!
//! A [`Channel`] bundles a configured HTTP client with the service base URL.
//! Opening a channel performs one probe against the status endpoint, so a
//! returned channel is known to have been reachable at least once.

use crate::error::channel::ChannelError;
use crate::{DEFAULT_SERVICE_PORT, READER_SERVICE_HOSTNAME};

use common::ErrorLocation;

use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info};
use reqwest::{Certificate, Client, Identity};
use url::Url;

const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);
const STATUS_ENDPOINT: &str = "status";

/// TLS policy for the channel to the instrument service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityMode {
    /// Plain HTTP. Only for loopback development setups.
    Insecure,
    /// TLS against the service's self-signed certificate. When the launcher
    /// wrote the generated certificate to disk, pass that path here to pin
    /// it; without a path, certificate validation is disabled for this
    /// channel.
    SelfSigned { trusted_cert: Option<PathBuf> },
    /// Mutual TLS with a client certificate and private key (PEM).
    Identity { cert: PathBuf, key: PathBuf },
    /// TLS validated against a custom certificate authority (PEM).
    CustomCa { ca_cert: PathBuf },
}

/// Connection parameters for the instrument service.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub security: SecurityMode,
    /// Per-command wait bound. A command exceeding it fails locally with a
    /// timeout while the remote outcome stays unknown.
    pub timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: READER_SERVICE_HOSTNAME.to_string(),
            port: DEFAULT_SERVICE_PORT,
            security: SecurityMode::SelfSigned { trusted_cert: None },
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }
}

impl ConnectionConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn base_url(&self) -> String {
        match self.security {
            SecurityMode::Insecure => format!("http://{}", self.address()),
            _ => format!("https://{}", self.address()),
        }
    }
}

/// An open, probed connection to the instrument service.
#[derive(Debug, Clone)]
pub struct Channel {
    base_url: Url,
    client: Client,
}

impl Channel {
    /// Open a channel under the configured security policy and verify the
    /// service answers its status endpoint.
    pub async fn open(config: &ConnectionConfig) -> Result<Self, ChannelError> {
        let base_url = Url::parse(&config.base_url())?;
        let client = build_client(config)?;

        let channel = Self { base_url, client };
        channel.probe_status().await?;

        info!("Channel open to {}", channel.base_url);
        Ok(channel)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Resolve an endpoint path against the service base URL.
    pub fn join(&self, endpoint: &str) -> Result<Url, ChannelError> {
        Ok(self.base_url.join(endpoint)?)
    }

    async fn probe_status(&self) -> Result<(), ChannelError> {
        let url = self.join(STATUS_ENDPOINT)?;
        debug!("Probing service status at {url}");

        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|e| ChannelError::Connect {
                    message: format!("Instrument service unreachable: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                })?;

        if !response.status().is_success() {
            return Err(ChannelError::Connect {
                message: format!(
                    "Status probe rejected with HTTP {}",
                    response.status().as_u16()
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }
}

fn build_client(config: &ConnectionConfig) -> Result<Client, ChannelError> {
    let mut builder = Client::builder().timeout(config.timeout);

    match &config.security {
        SecurityMode::Insecure => {}
        SecurityMode::SelfSigned {
            trusted_cert: Some(path),
        } => {
            builder = builder.add_root_certificate(read_certificate(path)?);
        }
        SecurityMode::SelfSigned { trusted_cert: None } => {
            builder = builder.danger_accept_invalid_certs(true);
        }
        SecurityMode::Identity { cert, key } => {
            builder = builder.identity(read_identity(cert, key)?);
        }
        SecurityMode::CustomCa { ca_cert } => {
            builder = builder.add_root_certificate(read_certificate(ca_cert)?);
        }
    }

    builder.build().map_err(|e| ChannelError::Tls {
        message: format!("Failed to build HTTP client: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}

#[track_caller]
fn read_certificate(path: &Path) -> Result<Certificate, ChannelError> {
    let pem = std::fs::read(path).map_err(|e| ChannelError::Tls {
        message: format!("Cannot read certificate {}: {e}", path.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    Certificate::from_pem(&pem).map_err(|e| ChannelError::Tls {
        message: format!("Invalid PEM certificate {}: {e}", path.display()),
        location: ErrorLocation::from(Location::caller()),
    })
}

fn read_identity(cert: &Path, key: &Path) -> Result<Identity, ChannelError> {
    let mut pem = std::fs::read(cert).map_err(|e| ChannelError::Tls {
        message: format!("Cannot read client certificate {}: {e}", cert.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let key_pem = std::fs::read(key).map_err(|e| ChannelError::Tls {
        message: format!("Cannot read client key {}: {e}", key.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    pem.extend_from_slice(&key_pem);

    Identity::from_pem(&pem).map_err(|e| ChannelError::Tls {
        message: format!("Invalid client identity: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}
