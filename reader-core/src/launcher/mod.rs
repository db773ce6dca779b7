//! Vendor application launcher.
//!
//! This module provides functionality for:
//! - Building the command line that enables the remote service
//! - Locating the vendor application on each supported platform
//! - Launching it and waiting for the service to become reachable
//! - Discovering an instance that is already running

pub mod process;
pub mod spawn;

pub use spawn::launch_and_wait;

use crate::{DEFAULT_SERVICE_PORT, READER_SERVICE_HOSTNAME};

use std::env;
use std::path::PathBuf;

const REMOTE_FLAG: &str = "--remote";
const PORT_FLAG: &str = "--remote-port";
const IP_FLAG: &str = "--remote-ip";
const INSECURE_FLAG: &str = "--remote-insecure";
const HEADLESS_FLAG: &str = "--headless";
const UUID_FLAG: &str = "--remote-uuid";
const CA_CERT_FLAG: &str = "--remote-ca-cert";
const CERT_FLAG: &str = "--remote-cert";
const KEY_FLAG: &str = "--remote-key";
const OUT_CERT_FLAG: &str = "--remote-out-cert";

const WINDOWS_APP_RELATIVE_PATH: &str = "Byonoy/Absorbance 96 App/app/absorbance96app.exe";
const MACOS_APP_BUNDLE: &str = "Absorbance 96 App.app";

/// Startup configuration for the vendor application's remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    pub port: u16,
    pub ip: String,
    pub insecure: bool,
    pub headless: bool,
    pub uuid: Option<String>,
    pub ca_cert: Option<PathBuf>,
    pub cert: Option<PathBuf>,
    pub key: Option<PathBuf>,
    /// Where the application writes its generated self-signed certificate.
    pub out_cert: Option<PathBuf>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_SERVICE_PORT,
            ip: READER_SERVICE_HOSTNAME.to_string(),
            insecure: false,
            headless: false,
            uuid: None,
            ca_cert: None,
            cert: None,
            key: None,
            out_cert: None,
        }
    }
}

impl LaunchConfig {
    /// Render the command-line flags enabling the remote service.
    ///
    /// `--remote` is always present; every other flag is emitted only when
    /// it differs from the application's own default.
    pub fn to_cli_args(&self) -> Vec<String> {
        let mut args = vec![REMOTE_FLAG.to_string()];

        if self.port != DEFAULT_SERVICE_PORT {
            args.push(PORT_FLAG.to_string());
            args.push(self.port.to_string());
        }
        if self.ip != READER_SERVICE_HOSTNAME {
            args.push(IP_FLAG.to_string());
            args.push(self.ip.clone());
        }
        if self.insecure {
            args.push(INSECURE_FLAG.to_string());
        }
        if self.headless {
            args.push(HEADLESS_FLAG.to_string());
        }
        if let Some(uuid) = &self.uuid {
            args.push(UUID_FLAG.to_string());
            args.push(uuid.clone());
        }
        if let Some(ca_cert) = &self.ca_cert {
            args.push(CA_CERT_FLAG.to_string());
            args.push(ca_cert.display().to_string());
        }
        if let Some(cert) = &self.cert {
            args.push(CERT_FLAG.to_string());
            args.push(cert.display().to_string());
        }
        if let Some(key) = &self.key {
            args.push(KEY_FLAG.to_string());
            args.push(key.display().to_string());
        }
        if let Some(out_cert) = &self.out_cert {
            args.push(OUT_CERT_FLAG.to_string());
            args.push(out_cert.display().to_string());
        }

        args
    }
}

/// Locate the vendor application's install path, if any.
///
/// Checks the usual install locations per platform. Linux has no vendor
/// build, so discovery always returns `None` there and callers must pass an
/// explicit path.
pub fn find_reader_app() -> Option<PathBuf> {
    let candidates: Vec<PathBuf> = match env::consts::OS {
        "windows" => {
            let program_dirs = [
                env::var("PROGRAMFILES(X86)").unwrap_or_else(|_| "C:/Program Files (x86)".into()),
                env::var("PROGRAMFILES").unwrap_or_else(|_| "C:/Program Files".into()),
                env::var("LOCALAPPDATA").map(|p| format!("{p}/Programs")).unwrap_or_default(),
            ];
            program_dirs
                .iter()
                .map(|dir| PathBuf::from(dir).join(WINDOWS_APP_RELATIVE_PATH))
                .collect()
        }
        "macos" => {
            let mut paths = vec![PathBuf::from("/Applications").join(MACOS_APP_BUNDLE)];
            if let Some(home) = dirs::home_dir() {
                paths.push(home.join("Applications").join(MACOS_APP_BUNDLE));
            }
            paths
        }
        _ => return None,
    };

    candidates.into_iter().find(|candidate| candidate.exists())
}
