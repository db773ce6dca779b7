//! Remote command invoker: one typed method per instrument operation.

pub mod http;

pub use http::HttpInvoker;

use crate::error::invoker::InvokerError;

use common::{ExportFormat, LockToken, WorkspaceUri};

/// The closed set of commands understood by the instrument service.
///
/// Every method resolves only after the service has acknowledged completion
/// or failure. Implementations never retry on their own: commands change the
/// physical instrument's state and are not idempotent (a second
/// `perform_readout` physically re-reads the plate), so retry policy belongs
/// to the caller.
///
/// All mutating commands carry the caller's [`LockToken`]; the service is
/// the source of truth for lock ownership and rejects tokens it does not
/// recognize.
#[allow(async_fn_in_trait)]
pub trait CommandInvoker {
    /// Establish the channel to the service.
    async fn open(&mut self) -> Result<(), InvokerError>;

    /// Tear down the channel. The remote lock, if held, expires server-side.
    async fn close(&mut self) -> Result<(), InvokerError>;

    /// Acquire the exclusive device lock under `token`.
    async fn lock(&mut self, token: &LockToken) -> Result<(), InvokerError>;

    /// Release the exclusive device lock held under `token`.
    async fn unlock(&mut self, token: &LockToken) -> Result<(), InvokerError>;

    /// Load a measurement protocol, superseding any previously loaded one.
    async fn load_workspace(
        &mut self,
        token: &LockToken,
        uri: &WorkspaceUri,
    ) -> Result<(), InvokerError>;

    /// Check reader status and protocol compatibility; after success the
    /// plate can be inserted.
    async fn prepare_for_readout(&mut self, token: &LockToken) -> Result<(), InvokerError>;

    /// Execute the measurement defined by the loaded protocol.
    async fn perform_readout(&mut self, token: &LockToken) -> Result<(), InvokerError>;

    /// Fetch the current result set rendered in `format`.
    async fn get_results(
        &mut self,
        token: &LockToken,
        format: ExportFormat,
    ) -> Result<Vec<u8>, InvokerError>;

    /// Write the current result set to `path` on the service machine.
    async fn export_results(
        &mut self,
        token: &LockToken,
        path: &str,
        format: ExportFormat,
    ) -> Result<(), InvokerError>;

    /// Shut down the vendor application. The only way to close it when it
    /// runs headless.
    async fn quit_application(&mut self, token: &LockToken) -> Result<(), InvokerError>;
}
