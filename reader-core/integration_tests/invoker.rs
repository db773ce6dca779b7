use crate::helpers::{open_invoker, start_mock_service};

use reader_core::channel::{ConnectionConfig, SecurityMode};
use reader_core::error::invoker::InvokerError;
use reader_core::invoker::http::LOCK_TOKEN_HEADER_KEY;
use reader_core::invoker::{CommandInvoker, HttpInvoker};

use common::{ExportFormat, LockToken, WorkspaceUri};

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// **VALUE**: Verifies that opening against a service with no status
/// endpoint fails as a connectivity error.
///
/// **WHY THIS MATTERS**: The status probe is the only thing standing between
/// "channel object exists" and "service actually answers". If probe failures
/// were swallowed, every later command would fail with a less useful error.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The status probe is skipped on open
/// - Probe rejections are mapped to the wrong error variant
#[tokio::test]
async fn given_service_without_status_when_open_then_connectivity_error() {
    // GIVEN: A server that answers nothing (wiremock defaults to 404)
    let server = MockServer::start().await;
    let address = server.address();
    let config = ConnectionConfig {
        host: address.ip().to_string(),
        port: address.port(),
        security: SecurityMode::Insecure,
        timeout: Duration::from_secs(5),
    };

    // WHEN: The invoker opens its channel
    let mut invoker = HttpInvoker::new(config);
    let result = invoker.open().await;

    // THEN: Connectivity error, not a silent success
    assert!(matches!(result, Err(InvokerError::Connectivity { .. })));
}

/// **VALUE**: Verifies the lock command carries the token and lease duration
/// the service expects.
///
/// **WHY THIS MATTERS**: The service identifies the lock holder purely by
/// the lock_id in this request. A malformed body acquires no lock, and every
/// subsequent command is rejected as unauthorized.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The token is serialized under the wrong key
/// - The lease duration field is missing or renamed
#[tokio::test]
async fn given_lock_command_when_sent_then_token_and_lease_in_body() {
    let (server, config) = start_mock_service().await;
    let token = LockToken::fresh();

    Mock::given(method("POST"))
        .and(path("/lock"))
        .and(body_partial_json(json!({
            "lock_id": token.to_string(),
            "timeout_s": 100,
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut invoker = open_invoker(&config).await;
    invoker.lock(&token).await.expect("Lock should succeed");
}

/// **VALUE**: Verifies the service's refusal reason reaches the caller
/// verbatim.
///
/// **WHY THIS MATTERS**: When another client holds the lock or the reader
/// has no plate inserted, the response body is the only explanation the
/// service gives. Discarding it leaves the operator with a bare status code.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Non-success responses are treated as transport errors
/// - The response body is dropped when building the error
#[tokio::test]
async fn given_rejecting_service_when_command_sent_then_refusal_preserved() {
    let (server, config) = start_mock_service().await;
    let token = LockToken::fresh();

    Mock::given(method("POST"))
        .and(path("/lock"))
        .respond_with(
            ResponseTemplate::new(409).set_body_string("Device is locked by another client"),
        )
        .mount(&server)
        .await;

    let mut invoker = open_invoker(&config).await;
    let result = invoker.lock(&token).await;

    match result {
        Err(InvokerError::RemoteRejected { message, .. }) => {
            assert!(message.contains("409"), "Status code missing: {message}");
            assert!(
                message.contains("Device is locked by another client"),
                "Refusal reason missing: {message}"
            );
        }
        other => panic!("Expected RemoteRejected, got {other:?}"),
    }
}

/// **VALUE**: Verifies workspace loading sends the lock token header and the
/// URI untouched.
///
/// **WHY THIS MATTERS**: The service resolves the URI on its own machine; if
/// the client normalized or re-encoded it, a path that works in the vendor
/// GUI could fail over the remote interface.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The lock token header is missing or misnamed
/// - The URI is mangled before serialization
#[tokio::test]
async fn given_workspace_load_when_sent_then_token_header_and_uri_body() {
    let (server, config) = start_mock_service().await;
    let token = LockToken::fresh();
    let uri = WorkspaceUri::parse("file:///protocols/elisa.ows").expect("Valid URI");

    Mock::given(method("PUT"))
        .and(path("/workspace"))
        .and(header(LOCK_TOKEN_HEADER_KEY, token.to_string()))
        .and(body_json(json!({ "uri": "file:///protocols/elisa.ows" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut invoker = open_invoker(&config).await;
    invoker
        .load_workspace(&token, &uri)
        .await
        .expect("Workspace load should succeed");
}

/// **VALUE**: Verifies result retrieval requests the right format and
/// returns the response body as raw bytes.
///
/// **WHY THIS MATTERS**: Formats like xlsx are binary; any text decoding or
/// re-encoding on the way through corrupts the file the user saves.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The format query parameter is dropped or misnamed
/// - Result bytes are altered in transit through the client
#[tokio::test]
async fn given_results_request_when_sent_then_format_query_and_raw_bytes() {
    let (server, config) = start_mock_service().await;
    let token = LockToken::fresh();
    let payload: &[u8] = b"PK\x03\x04binary-workbook";

    Mock::given(method("GET"))
        .and(path("/results"))
        .and(query_param("format", "xlsx"))
        .and(header(LOCK_TOKEN_HEADER_KEY, token.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(payload))
        .expect(1)
        .mount(&server)
        .await;

    let mut invoker = open_invoker(&config).await;
    let bytes = invoker
        .get_results(&token, ExportFormat::Xlsx)
        .await
        .expect("Results should come back");

    assert_eq!(bytes, payload);
}

/// **VALUE**: Verifies the export command names the destination path and
/// format in its body.
///
/// **WHY THIS MATTERS**: Export writes on the service machine; the path in
/// this request decides where the file lands. A dropped field exports to a
/// default location, or not at all.
///
/// **BUG THIS CATCHES**: Would catch the path and format fields being
/// renamed or swapped in the request body.
#[tokio::test]
async fn given_export_command_when_sent_then_path_and_format_in_body() {
    let (server, config) = start_mock_service().await;
    let token = LockToken::fresh();

    Mock::given(method("POST"))
        .and(path("/export"))
        .and(header(LOCK_TOKEN_HEADER_KEY, token.to_string()))
        .and(body_json(json!({
            "path": "C:/data/run-042.csv",
            "format": "csv",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut invoker = open_invoker(&config).await;
    invoker
        .export_results(&token, "C:/data/run-042.csv", ExportFormat::Csv)
        .await
        .expect("Export should succeed");
}

/// **VALUE**: Verifies a command exceeding the configured wait bound fails
/// as a timeout, distinct from connectivity loss.
///
/// **WHY THIS MATTERS**: On timeout the remote outcome is unknown; callers
/// must treat it differently from a refused or unreachable command. Folding
/// timeouts into generic connectivity errors erases that distinction.
///
/// **BUG THIS CATCHES**: Would catch reqwest timeout errors being mapped to
/// the connectivity variant.
#[tokio::test]
async fn given_slow_service_when_command_exceeds_timeout_then_timeout_error() {
    let (server, mut config) = start_mock_service().await;
    config.timeout = Duration::from_millis(200);
    let token = LockToken::fresh();

    Mock::given(method("POST"))
        .and(path("/prepare"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let mut invoker = open_invoker(&config).await;
    let result = invoker.prepare_for_readout(&token).await;

    assert!(matches!(result, Err(InvokerError::Timeout { .. })));
}
