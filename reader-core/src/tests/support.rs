//! Scripted invoker for exercising the session state machine without a
//! running service.

use crate::error::invoker::InvokerError;
use crate::invoker::CommandInvoker;

use common::{ErrorLocation, ExportFormat, LockToken, WorkspaceUri};

use std::panic::Location;

#[derive(Debug, Default)]
pub(crate) struct MockInvoker {
    /// Operation names in invocation order.
    pub calls: Vec<String>,
    /// Operation whose invocations fail with a remote rejection.
    pub fail_on: Option<&'static str>,
    /// Completed readouts; results content depends on it, so staleness is
    /// observable.
    pub readouts: u32,
    /// Every token the service was asked to lock under.
    pub locked_tokens: Vec<LockToken>,
}

impl MockInvoker {
    fn record(&mut self, op: &'static str) -> Result<(), InvokerError> {
        self.calls.push(op.to_string());

        if self.fail_on == Some(op) {
            return Err(InvokerError::RemoteRejected {
                message: format!("device busy during {op}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls.iter().filter(|c| c.as_str() == op).count()
    }
}

impl CommandInvoker for MockInvoker {
    async fn open(&mut self) -> Result<(), InvokerError> {
        self.record("open")
    }

    async fn close(&mut self) -> Result<(), InvokerError> {
        self.record("close")
    }

    async fn lock(&mut self, token: &LockToken) -> Result<(), InvokerError> {
        self.record("lock")?;
        self.locked_tokens.push(token.clone());
        Ok(())
    }

    async fn unlock(&mut self, _token: &LockToken) -> Result<(), InvokerError> {
        self.record("unlock")
    }

    async fn load_workspace(
        &mut self,
        _token: &LockToken,
        _uri: &WorkspaceUri,
    ) -> Result<(), InvokerError> {
        self.record("load_workspace")
    }

    async fn prepare_for_readout(&mut self, _token: &LockToken) -> Result<(), InvokerError> {
        self.record("prepare")
    }

    async fn perform_readout(&mut self, _token: &LockToken) -> Result<(), InvokerError> {
        self.record("readout")?;
        self.readouts += 1;
        Ok(())
    }

    async fn get_results(
        &mut self,
        _token: &LockToken,
        format: ExportFormat,
    ) -> Result<Vec<u8>, InvokerError> {
        self.record("get_results")?;
        Ok(format!("readout-{}.{}", self.readouts, format.wire_value()).into_bytes())
    }

    async fn export_results(
        &mut self,
        _token: &LockToken,
        _path: &str,
        _format: ExportFormat,
    ) -> Result<(), InvokerError> {
        self.record("export")
    }

    async fn quit_application(&mut self, _token: &LockToken) -> Result<(), InvokerError> {
        self.record("quit")
    }
}
