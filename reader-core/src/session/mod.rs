//! Session state machine over the remote instrument service.
//!
//! The instrument is a single physical resource: commands must never race,
//! have mandatory ordering prerequisites, and are guarded here before any
//! RPC is attempted. The session mirrors what is known to be true remotely -
//! its stage advances only after a successful remote response, so on any
//! failure the last good state is preserved and a retry is well-defined.
//!
//! A [`Session`] is single-owner by design and not safe for unsynchronized
//! concurrent use; the exclusive lock itself is enforced by the remote
//! service, the local stage is only a fast-fail mirror.

use crate::error::session::SessionError;
use crate::invoker::CommandInvoker;

use common::{ErrorLocation, ExportFormat, LockToken, WorkspaceUri};

use std::panic::Location;

use futures_util::future::BoxFuture;
use log::{debug, info, warn};

/// Workflow progress, ordered from initial to terminal.
///
/// `WorkspaceLoaded`, `Prepared` and `ReadoutComplete` are sub-states of
/// holding the lock: any stage at or beyond `Locked` implies a live
/// [`LockToken`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Disconnected,
    Connected,
    Locked,
    WorkspaceLoaded,
    Prepared,
    ReadoutComplete,
}

/// Client-side controller for one instrument workflow.
pub struct Session<I: CommandInvoker> {
    invoker: I,
    stage: Stage,
    token: Option<LockToken>,
    workspace: Option<WorkspaceUri>,
}

impl<I: CommandInvoker> Session<I> {
    pub fn new(invoker: I) -> Self {
        Self {
            invoker,
            stage: Stage::Disconnected,
            token: None,
            workspace: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    pub fn invoker_mut(&mut self) -> &mut I {
        &mut self.invoker
    }

    pub fn lock_held(&self) -> bool {
        self.token.is_some()
    }

    pub fn workspace(&self) -> Option<&WorkspaceUri> {
        self.workspace.as_ref()
    }

    #[track_caller]
    fn prerequisite(message: &str) -> SessionError {
        SessionError::Prerequisite {
            message: message.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    fn require(&self, at_least: Stage, missing: &str) -> Result<(), SessionError> {
        if self.stage >= at_least {
            Ok(())
        } else {
            Err(Self::prerequisite(missing))
        }
    }

    #[track_caller]
    fn held_token(&self) -> Result<LockToken, SessionError> {
        self.token
            .clone()
            .ok_or_else(|| Self::prerequisite("lock not held"))
    }

    /// Open the connection to the instrument service.
    pub async fn connect(&mut self) -> Result<(), SessionError> {
        if self.stage != Stage::Disconnected {
            return Err(Self::prerequisite("already connected"));
        }

        self.invoker.open().await?;
        self.stage = Stage::Connected;
        info!("Session connected");
        Ok(())
    }

    /// Acquire the exclusive device lock with a fresh token.
    ///
    /// A token that survived a disconnect is never reused: every
    /// acquisition mints a new one, so stale local lock state cannot be
    /// mistaken for remote ownership after a connectivity interruption.
    pub async fn acquire_lock(&mut self) -> Result<(), SessionError> {
        if self.stage >= Stage::Locked {
            return Err(Self::prerequisite("lock already held"));
        }
        self.require(Stage::Connected, "not connected")?;

        let token = LockToken::fresh();
        self.invoker.lock(&token).await?;

        debug!("Acquired exclusive lock {token}");
        self.token = Some(token);
        self.stage = Stage::Locked;
        Ok(())
    }

    /// Release the exclusive device lock from any locked sub-state.
    pub async fn release_lock(&mut self) -> Result<(), SessionError> {
        self.require(Stage::Locked, "lock not held")?;
        let token = self.held_token()?;

        self.invoker.unlock(&token).await?;

        debug!("Released exclusive lock {token}");
        self.token = None;
        self.workspace = None;
        self.stage = Stage::Connected;
        Ok(())
    }

    /// Load a measurement protocol from a `file://` or `http(s)://` URI.
    ///
    /// The URI is validated locally first; an unsupported scheme never
    /// reaches the service. Reloading supersedes the previous workspace and
    /// drops any prepared or read-out state.
    pub async fn load_workspace(&mut self, uri: &str) -> Result<(), SessionError> {
        self.require(Stage::Locked, "lock not held")?;
        let workspace = WorkspaceUri::parse(uri)?;
        let token = self.held_token()?;

        self.invoker.load_workspace(&token, &workspace).await?;

        info!("Workspace loaded: {workspace}");
        self.workspace = Some(workspace);
        self.stage = Stage::WorkspaceLoaded;
        Ok(())
    }

    /// Ready the reader for measurement; after success the plate can be
    /// inserted.
    pub async fn prepare_for_readout(&mut self) -> Result<(), SessionError> {
        self.require(Stage::WorkspaceLoaded, "no workspace loaded")?;
        let token = self.held_token()?;

        self.invoker.prepare_for_readout(&token).await?;

        debug!("Reader prepared for readout");
        self.stage = Stage::Prepared;
        Ok(())
    }

    /// Run the measurement. Any result set from an earlier readout is
    /// superseded on the instrument; nothing is cached locally, so a later
    /// [`Session::get_results`] can never serve stale data.
    pub async fn perform_readout(&mut self) -> Result<(), SessionError> {
        self.require(Stage::Prepared, "reader not prepared for readout")?;
        let token = self.held_token()?;

        self.invoker.perform_readout(&token).await?;

        info!("Readout complete");
        self.stage = Stage::ReadoutComplete;
        Ok(())
    }

    /// Fetch the current result set rendered in `format`.
    pub async fn get_results(&mut self, format: ExportFormat) -> Result<Vec<u8>, SessionError> {
        self.require(Stage::ReadoutComplete, "no readout performed")?;
        let token = self.held_token()?;

        let bytes = self.invoker.get_results(&token, format).await?;
        debug!("Fetched {} result bytes ({format})", bytes.len());
        Ok(bytes)
    }

    /// Write the current result set to `path` on the service machine.
    pub async fn export_results(
        &mut self,
        path: &str,
        format: ExportFormat,
    ) -> Result<(), SessionError> {
        self.require(Stage::ReadoutComplete, "no readout performed")?;
        let token = self.held_token()?;

        self.invoker.export_results(&token, path, format).await?;
        info!("Results exported to {path} ({format})");
        Ok(())
    }

    /// Shut down the vendor application. Requires the lock; afterwards the
    /// session is disconnected and only a fresh session can reconnect.
    pub async fn quit_application(&mut self) -> Result<(), SessionError> {
        self.require(Stage::Locked, "lock not held")?;
        let token = self.held_token()?;

        self.invoker.quit_application(&token).await?;

        info!("Remote application quit; session is no longer usable");
        self.token = None;
        self.workspace = None;
        self.stage = Stage::Disconnected;
        self.invoker.close().await?;
        Ok(())
    }

    /// Drop the connection from any stage.
    pub async fn disconnect(&mut self) -> Result<(), SessionError> {
        if self.token.is_some() {
            warn!("Disconnecting with lock held; the remote lock will expire on its own");
        }

        self.invoker.close().await?;
        self.token = None;
        self.workspace = None;
        self.stage = Stage::Disconnected;
        info!("Session disconnected");
        Ok(())
    }

    /// Run `body` with the exclusive lock held, releasing it exactly once on
    /// every exit path.
    ///
    /// Acquisition failure propagates without a release attempt. When the
    /// body fails, the lock is still released and the body's error takes
    /// precedence; a release failure on that path is logged, not returned.
    /// Nested acquisition inside `body` fails with a prerequisite error and
    /// leaves the outer lock intact.
    pub async fn with_lock<T, F>(&mut self, body: F) -> Result<T, SessionError>
    where
        F: for<'a> FnOnce(&'a mut Session<I>) -> BoxFuture<'a, Result<T, SessionError>>,
    {
        self.acquire_lock().await?;

        let outcome = body(self).await;
        let released = self.release_lock().await;

        match outcome {
            Ok(value) => {
                released?;
                Ok(value)
            }
            Err(err) => {
                if let Err(release_err) = released {
                    warn!("Lock release after failed body also failed: {release_err}");
                }
                Err(err)
            }
        }
    }
}
