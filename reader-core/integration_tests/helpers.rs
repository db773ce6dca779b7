//! Test helpers for integration tests against a mocked instrument service.
//!
//! This module provides utilities for:
//! - Starting a mock HTTP service that answers the status probe
//! - Building connection settings that point at the mock
//! - Opening a ready-to-use invoker against it

use reader_core::channel::{ConnectionConfig, SecurityMode};
use reader_core::invoker::{CommandInvoker, HttpInvoker};

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test helper: Start a mock service whose status endpoint answers 200, so
/// channels can open against it.
pub async fn start_mock_service() -> (MockServer, ConnectionConfig) {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let address = server.address();
    let config = ConnectionConfig {
        host: address.ip().to_string(),
        port: address.port(),
        security: SecurityMode::Insecure,
        timeout: Duration::from_secs(5),
    };

    (server, config)
}

/// Test helper: Open an invoker against an already-mocked service.
pub async fn open_invoker(config: &ConnectionConfig) -> HttpInvoker {
    let mut invoker = HttpInvoker::new(config.clone());
    invoker
        .open()
        .await
        .expect("Mock service should be reachable");
    invoker
}
