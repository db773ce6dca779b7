//! High-level assay workflow composed from the session primitives.

use crate::channel::ConnectionConfig;
use crate::error::session::SessionError;
use crate::invoker::{CommandInvoker, HttpInvoker};
use crate::session::Session;

use common::ExportFormat;

use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use futures_util::FutureExt;
use log::{info, trace};
use tokio::time::sleep as TokioSleep;

const CONNECT_MAX_ELAPSED: Duration = Duration::from_secs(20);

/// Connect, retrying with exponential backoff while the service starts up.
///
/// The vendor application needs a moment between launch and serving its
/// endpoint. Prerequisite errors are caller bugs and are never retried.
pub async fn connect_with_backoff<I: CommandInvoker>(
    session: &mut Session<I>,
) -> Result<(), SessionError> {
    let mut backoff = ExponentialBackoff {
        max_elapsed_time: Some(CONNECT_MAX_ELAPSED),
        ..Default::default()
    };

    loop {
        match session.connect().await {
            Ok(()) => return Ok(()),
            Err(err @ SessionError::Prerequisite { .. }) => return Err(err),
            Err(err) => match backoff.next_backoff() {
                Some(duration) => {
                    trace!("Service not ready ({err}), retrying after {duration:?}");
                    TokioSleep(duration).await;
                }
                None => return Err(err),
            },
        }
    }
}

/// Run a complete assay: connect, then under the exclusive lock load the
/// protocol, prepare, read out and collect results, then disconnect.
///
/// With `export_path` set, results are written to that path on the service
/// machine and `None` is returned; otherwise the result bytes come back in
/// the requested format. This helper is purely a composition of the session
/// operations and adds no guarantees of its own.
pub async fn run_assay(
    config: ConnectionConfig,
    protocol_uri: &str,
    format: ExportFormat,
    export_path: Option<&str>,
) -> Result<Option<Vec<u8>>, SessionError> {
    let mut session = Session::new(HttpInvoker::new(config));

    connect_with_backoff(&mut session).await?;
    info!("Starting assay for {protocol_uri}");

    let protocol_uri = protocol_uri.to_owned();
    let export_path = export_path.map(str::to_owned);

    let outcome = session
        .with_lock(|s| {
            async move {
                s.load_workspace(&protocol_uri).await?;
                s.prepare_for_readout().await?;
                s.perform_readout().await?;

                match export_path {
                    Some(path) => {
                        s.export_results(&path, format).await?;
                        Ok(None)
                    }
                    None => Ok(Some(s.get_results(format).await?)),
                }
            }
            .boxed()
        })
        .await;

    let disconnected = session.disconnect().await;
    let value = outcome?;
    disconnected?;

    Ok(value)
}
