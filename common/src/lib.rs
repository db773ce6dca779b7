//! Domain models for the plate-reader remote control client.
//!
//! This crate contains pure data structures representing the core
//! concepts in our application. Models have no business logic - they're
//! just data that can be passed between layers.
//!
//! ## Architecture
//!
//! - **common** (this crate): Pure data structures
//! - **reader-core**: Business logic operating on models
//!
//! This layered architecture keeps concerns separated and makes testing easier.

pub mod error;
pub mod export_format;
pub mod instrument_info;
pub mod lock_token;
pub mod workspace_uri;

#[cfg(test)]
mod tests;

pub use error::error_location::ErrorLocation;
pub use error::model_error::ModelError;
pub use export_format::ExportFormat;
pub use instrument_info::{InstrumentInfo, InstrumentInfoBuilder};
pub use lock_token::LockToken;
pub use workspace_uri::WorkspaceUri;
