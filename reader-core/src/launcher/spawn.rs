use crate::channel::{ConnectionConfig, SecurityMode};
use crate::error::launch::LaunchError;
use crate::launcher::process::check_ready;
use crate::launcher::{LaunchConfig, find_reader_app};
use crate::{READER_BINARY, READER_SERVICE_HOSTNAME};

use common::{ErrorLocation, InstrumentInfo, InstrumentInfoBuilder};

use std::env;
use std::mem::forget;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use log::{debug, info, trace, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child as TokioChild, Command as TokioCommand};
use tokio::spawn as TokioSpawn;
use tokio::time::sleep as TokioSleep;

/// GUI application startup is slow; give the remote service a wide window.
const READY_MAX_ELAPSED: Duration = Duration::from_secs(60);

const MACOS_OPEN_BINARY: &str = "open";
const MACOS_OPEN_ARGS_SEPARATOR: &str = "--args";
const WILDCARD_BIND_IP: &str = "0.0.0.0";

pub(crate) fn build_launch_command(
    app_path: &Path,
    config: &LaunchConfig,
) -> Result<TokioCommand, LaunchError> {
    let mut cmd = match env::consts::OS {
        "windows" => {
            let mut cmd = TokioCommand::new(app_path);
            cmd.args(config.to_cli_args());
            cmd
        }
        "macos" => {
            let mut cmd = TokioCommand::new(MACOS_OPEN_BINARY);
            cmd.arg(app_path)
                .arg(MACOS_OPEN_ARGS_SEPARATOR)
                .args(config.to_cli_args());
            cmd
        }
        other => {
            return Err(LaunchError::Validation {
                message: format!("Unsupported operating system: {other}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }
    };

    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    Ok(cmd)
}

/// Drain the child's stdout/stderr into trace logs.
///
/// Nobody waits on the child after detach; without a reader on each piped
/// stream, the application blocks on write once the OS pipe buffer fills.
pub(crate) fn drain_child_output(child: &mut TokioChild) {
    if let Some(stdout) = child.stdout.take() {
        TokioSpawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                trace!("App stdout: {line}");
            }
        });
    }

    if let Some(stderr) = child.stderr.take() {
        TokioSpawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                trace!("App stderr: {line}");
            }
        });
    }
}

/// Derive the client-side connection settings matching a launch config.
///
/// A wildcard bind address is reachable via loopback from this machine.
pub fn connection_config_for(config: &LaunchConfig) -> ConnectionConfig {
    let host = if config.ip == WILDCARD_BIND_IP {
        READER_SERVICE_HOSTNAME.to_string()
    } else {
        config.ip.clone()
    };

    let security = if config.insecure {
        SecurityMode::Insecure
    } else {
        SecurityMode::SelfSigned {
            trusted_cert: config.out_cert.clone(),
        }
    };

    ConnectionConfig {
        host,
        port: config.port,
        security,
        ..ConnectionConfig::default()
    }
}

/// Launch the vendor application with the remote service enabled and wait
/// for the service to become reachable.
///
/// The application path is auto-detected when not given. The child is
/// detached once the service answers; the application keeps running until
/// told to quit (or, headless, until `quit_application`).
///
/// # Returns
///
/// * `Ok(InstrumentInfo)` - Application launched and the service answered
/// * `Err(LaunchError)` - Could not locate, spawn, or reach the service
pub async fn launch_and_wait(
    config: &LaunchConfig,
    app_path: Option<PathBuf>,
) -> Result<InstrumentInfo, LaunchError> {
    let app_path = app_path
        .or_else(find_reader_app)
        .ok_or_else(|| LaunchError::Validation {
            message: String::from(
                "Could not find the Absorbance 96 App; pass its path explicitly",
            ),
            location: ErrorLocation::from(Location::caller()),
        })?;

    info!(
        "Launching {} with remote service on port {}",
        app_path.display(),
        config.port
    );

    let mut child = build_launch_command(&app_path, config)?
        .spawn()
        .map_err(|e| LaunchError::Spawn {
            message: format!("Failed to launch {}: {e}", app_path.display()),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(e),
        })?;

    drain_child_output(&mut child);

    let connection = connection_config_for(config);

    if let Err(e) = wait_for_ready(&connection).await {
        warn!(
            "Service never became ready, stopping launched application (PID: {:?})",
            child.id()
        );
        let _ = child.kill().await;
        return Err(e);
    }

    let pid = child.id().unwrap_or_default();
    info!(
        "Instrument service ready at {} (PID: {pid})",
        connection.base_url()
    );

    // Detach the child process - the application keeps running on its own
    forget(child);

    let info = InstrumentInfoBuilder::default()
        .with_pid(pid)
        .with_port(config.port)
        .with_base_url(connection.base_url())
        .with_name(READER_BINARY)
        .with_command(format!(
            "{} {}",
            app_path.display(),
            config.to_cli_args().join(" ")
        ))
        .with_owned(true)
        .build()?;

    Ok(info)
}

async fn wait_for_ready(connection: &ConnectionConfig) -> Result<(), LaunchError> {
    let mut backoff = ExponentialBackoff {
        max_elapsed_time: Some(READY_MAX_ELAPSED),
        ..Default::default()
    };

    debug!("Waiting for service readiness at {}", connection.base_url());

    loop {
        if check_ready(connection).await {
            info!("Service is ready at {}", connection.base_url());
            return Ok(());
        }

        match backoff.next_backoff() {
            Some(duration) => {
                trace!("Service not ready, retrying after {duration:?}");
                TokioSleep(duration).await;
            }
            None => {
                return Err(LaunchError::Timeout {
                    message: format!(
                        "Service at {} did not become ready within {READY_MAX_ELAPSED:?}",
                        connection.base_url()
                    ),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }
    }
}
