use crate::channel::{Channel, ConnectionConfig};
use crate::error::invoker::InvokerError;
use crate::invoker::CommandInvoker;

use common::{ErrorLocation, ExportFormat, LockToken, WorkspaceUri};

use std::panic::Location;

use log::{debug, trace};
use reqwest::Response;
use serde_json::json;

const LOCK_ENDPOINT: &str = "lock";
const UNLOCK_ENDPOINT: &str = "unlock";
const WORKSPACE_ENDPOINT: &str = "workspace";
const PREPARE_ENDPOINT: &str = "prepare";
const READOUT_ENDPOINT: &str = "readout";
const RESULTS_ENDPOINT: &str = "results";
const EXPORT_ENDPOINT: &str = "export";
const QUIT_ENDPOINT: &str = "quit";

const FORMAT_QUERY_KEY: &str = "format";
pub const LOCK_TOKEN_HEADER_KEY: &str = "x-reader-lock-id";

/// Seconds the service keeps an unrefreshed lock alive before reclaiming it.
const LOCK_TIMEOUT_SECS: u64 = 100;

/// Production invoker speaking the instrument service's REST surface.
#[derive(Debug)]
pub struct HttpInvoker {
    config: ConnectionConfig,
    channel: Option<Channel>,
}

impl HttpInvoker {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            channel: None,
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    #[track_caller]
    fn channel(&self) -> Result<&Channel, InvokerError> {
        self.channel.as_ref().ok_or_else(|| InvokerError::Connectivity {
            message: String::from("Channel not open"),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Map a non-success response to the service's refusal, body verbatim.
    async fn ack(response: Response) -> Result<Response, InvokerError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        Err(InvokerError::RemoteRejected {
            message: format!(
                "HTTP {} - {}",
                status.as_u16(),
                response.text().await.unwrap_or_default()
            ),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    async fn post_command(&self, endpoint: &str, token: &LockToken) -> Result<(), InvokerError> {
        let channel = self.channel()?;
        let url = channel.join(endpoint)?;
        trace!("POST {url}");

        let response = channel
            .client()
            .post(url)
            .header(LOCK_TOKEN_HEADER_KEY, token.to_string())
            .send()
            .await?;

        Self::ack(response).await?;
        Ok(())
    }
}

impl CommandInvoker for HttpInvoker {
    async fn open(&mut self) -> Result<(), InvokerError> {
        let channel = Channel::open(&self.config).await?;
        debug!("Invoker channel established to {}", channel.base_url());
        self.channel = Some(channel);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), InvokerError> {
        if self.channel.take().is_some() {
            debug!("Invoker channel closed");
        }
        Ok(())
    }

    async fn lock(&mut self, token: &LockToken) -> Result<(), InvokerError> {
        let channel = self.channel()?;
        let url = channel.join(LOCK_ENDPOINT)?;

        let body = json!({
            "lock_id": token.to_string(),
            "timeout_s": LOCK_TIMEOUT_SECS,
        });

        let response = channel.client().post(url).json(&body).send().await?;
        Self::ack(response).await?;
        Ok(())
    }

    async fn unlock(&mut self, token: &LockToken) -> Result<(), InvokerError> {
        let channel = self.channel()?;
        let url = channel.join(UNLOCK_ENDPOINT)?;

        let body = json!({ "lock_id": token.to_string() });

        let response = channel.client().post(url).json(&body).send().await?;
        Self::ack(response).await?;
        Ok(())
    }

    async fn load_workspace(
        &mut self,
        token: &LockToken,
        uri: &WorkspaceUri,
    ) -> Result<(), InvokerError> {
        let channel = self.channel()?;
        let url = channel.join(WORKSPACE_ENDPOINT)?;

        let body = json!({ "uri": uri.as_str() });

        let response = channel
            .client()
            .put(url)
            .header(LOCK_TOKEN_HEADER_KEY, token.to_string())
            .json(&body)
            .send()
            .await?;

        Self::ack(response).await?;
        Ok(())
    }

    async fn prepare_for_readout(&mut self, token: &LockToken) -> Result<(), InvokerError> {
        self.post_command(PREPARE_ENDPOINT, token).await
    }

    async fn perform_readout(&mut self, token: &LockToken) -> Result<(), InvokerError> {
        self.post_command(READOUT_ENDPOINT, token).await
    }

    async fn get_results(
        &mut self,
        token: &LockToken,
        format: ExportFormat,
    ) -> Result<Vec<u8>, InvokerError> {
        let channel = self.channel()?;
        let url = channel.join(RESULTS_ENDPOINT)?;

        let response = channel
            .client()
            .get(url)
            .query(&[(FORMAT_QUERY_KEY, format.wire_value())])
            .header(LOCK_TOKEN_HEADER_KEY, token.to_string())
            .send()
            .await?;

        let response = Self::ack(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn export_results(
        &mut self,
        token: &LockToken,
        path: &str,
        format: ExportFormat,
    ) -> Result<(), InvokerError> {
        let channel = self.channel()?;
        let url = channel.join(EXPORT_ENDPOINT)?;

        let body = json!({
            "path": path,
            "format": format.wire_value(),
        });

        let response = channel
            .client()
            .post(url)
            .header(LOCK_TOKEN_HEADER_KEY, token.to_string())
            .json(&body)
            .send()
            .await?;

        Self::ack(response).await?;
        Ok(())
    }

    async fn quit_application(&mut self, token: &LockToken) -> Result<(), InvokerError> {
        self.post_command(QUIT_ENDPOINT, token).await
    }
}
