use crate::channel::{Channel, ConnectionConfig};
use crate::error::launch::LaunchError;
use crate::{READER_BINARY, READER_SERVICE_BASE_URL};

use common::{ErrorLocation, InstrumentInfo, InstrumentInfoBuilder};

use std::panic::Location;
use std::thread::sleep;
use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use log::{debug, trace};
use netstat2::{
    AddressFamilyFlags, ProtocolFlags, ProtocolSocketInfo, SocketInfo, TcpState, get_sockets_info,
};
use sysinfo::{Pid, Process, ProcessesToUpdate, Signal, System};

const KILL_VERIFY_MAX_ELAPSED: Duration = Duration::from_secs(5);

#[track_caller]
fn query_tcp_sockets() -> Result<Vec<SocketInfo>, LaunchError> {
    get_sockets_info(
        AddressFamilyFlags::IPV4 | AddressFamilyFlags::IPV6,
        ProtocolFlags::TCP,
    )
    .map_err(|e| LaunchError::Query {
        message: format!("Failed to query network sockets: {e}"),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(e),
    })
}

#[track_caller]
pub(crate) fn with_process<F, R>(pid: u32, f: F) -> Option<R>
where
    F: FnOnce(&Process) -> R,
{
    let mut sys = System::new_all();
    sys.refresh_processes(ProcessesToUpdate::All, true);

    sys.process(Pid::from_u32(pid)).map(f)
}

pub(crate) fn format_command(process: &Process) -> String {
    let cmd_vec: Vec<String> = process
        .cmd()
        .iter()
        .map(|s| s.to_string_lossy().to_string())
        .collect();

    cmd_vec.join(" ")
}

/// Discover a vendor application instance already serving the given port.
///
/// The instrument is a single physical resource; launching a second
/// application against it would fail or, worse, fight over the device.
/// Callers should discover before launching.
///
/// # Returns
///
/// * `Ok(Some(InstrumentInfo))` - A process is listening on the port
/// * `Ok(None)` - Nothing is listening there
/// * `Err(LaunchError)` - Process/network queries failed
#[track_caller]
pub fn discover(port: u16) -> Result<Option<InstrumentInfo>, LaunchError> {
    debug!("Looking for a running instrument service on port {port}");

    let sockets = query_tcp_sockets()?;

    for s in sockets {
        if let ProtocolSocketInfo::Tcp(tcp) = s.protocol_socket_info
            && tcp.state == TcpState::Listen
            && tcp.local_port == port
            && let Some(&pid) = s.associated_pids.first()
        {
            trace!("Found process {pid} listening on port {port}");

            let data = with_process(pid, |p| {
                (p.name().to_string_lossy().to_string(), format_command(p))
            });

            if let Some((name, command)) = data {
                let base_url = format!("{READER_SERVICE_BASE_URL}:{port}");

                debug!("Discovered running service: {name} (PID: {pid})");

                let info = InstrumentInfoBuilder::default()
                    .with_pid(pid)
                    .with_port(port)
                    .with_base_url(base_url)
                    .with_name(READER_BINARY)
                    .with_command(command)
                    .with_owned(false)
                    .build()?;

                return Ok(Some(info));
            }

            trace!("Process {pid} disappeared before we could read its info");
        }
    }

    debug!("No process found listening on port {port}");
    Ok(None)
}

/// Stop a vendor application process by PID.
///
/// Attempts graceful termination (SIGTERM) first, falls back to force kill
/// (SIGKILL), then verifies with exponential backoff that the process is
/// gone. PID 0 and PID 1 are refused outright.
///
/// # Returns
///
/// * `true` - The process was terminated
/// * `false` - The process doesn't exist, is protected, or wouldn't die
pub fn stop_pid(pid: u32) -> bool {
    if pid <= 1 {
        debug!("Refusing to stop protected PID {pid}");
        return false;
    }

    let killed = with_process(pid, |p| {
        if let Some(sent) = p.kill_with(Signal::Term) {
            debug!("Sent SIGTERM to PID {pid}: success={sent}");
            sent
        } else {
            let killed = p.kill();
            debug!("Sent SIGKILL to PID {pid}: success={killed}");
            killed
        }
    })
    .unwrap_or_else(|| {
        debug!("Process {pid} not found");
        false
    });

    if !killed {
        return false;
    }

    let mut backoff = ExponentialBackoff {
        max_elapsed_time: Some(KILL_VERIFY_MAX_ELAPSED),
        ..Default::default()
    };

    loop {
        if with_process(pid, |_| true).is_none() {
            debug!("Process {pid} successfully terminated");
            return true;
        }

        match backoff.next_backoff() {
            Some(duration) => {
                trace!("Process {pid} still alive, retrying after {duration:?}");
                sleep(duration);
            }
            None => {
                debug!("Process {pid} still running after max backoff time");
                return false;
            }
        }
    }
}

/// Check whether the instrument service answers at the configured endpoint.
///
/// A readiness probe is just a successful channel open (which performs the
/// status-endpoint handshake under the configured security mode).
pub async fn check_ready(connection: &ConnectionConfig) -> bool {
    match Channel::open(connection).await {
        Ok(_) => {
            debug!("Readiness probe succeeded for {}", connection.base_url());
            true
        }
        Err(e) => {
            debug!(
                "Readiness probe failed for {}: {e}",
                connection.base_url()
            );
            false
        }
    }
}
