pub mod builder;

pub use builder::InstrumentInfoBuilder;

use serde::Serialize;

/// Description of a running vendor application exposing the remote service.
///
/// Produced either by launching the application ourselves or by discovering
/// an instance that is already listening on the configured port.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InstrumentInfo {
    pub pid: u32,
    pub port: u16,
    pub base_url: String,
    pub name: String,
    pub command: String,
    /// True when this client launched the process (and may stop it).
    pub owned: bool,
}
