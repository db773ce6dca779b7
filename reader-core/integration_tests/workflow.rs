use crate::helpers::start_mock_service;

use reader_core::error::invoker::InvokerError;
use reader_core::error::session::SessionError;
use reader_core::workflow::run_assay;

use common::ExportFormat;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_ok(server: &MockServer, verb: &str, endpoint: &str) {
    Mock::given(method(verb))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

/// **VALUE**: Verifies a complete assay against a live HTTP surface: lock,
/// load, prepare, read out, fetch results, unlock.
///
/// **WHY THIS MATTERS**: Unit tests exercise the state machine against a
/// scripted invoker; this is the only test proving the composed workflow
/// drives the real HTTP invoker end to end, including lock bracketing.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Any step hits the wrong endpoint or verb
/// - The lock is acquired or released more than once
/// - Result bytes are lost between the service and the caller
#[tokio::test]
async fn given_healthy_service_when_assay_run_then_results_returned_and_lock_released() {
    // GIVEN: A service accepting the full command sequence
    let (server, config) = start_mock_service().await;

    Mock::given(method("POST"))
        .and(path("/lock"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/unlock"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    mount_ok(&server, "PUT", "/workspace").await;
    mount_ok(&server, "POST", "/prepare").await;
    mount_ok(&server, "POST", "/readout").await;
    Mock::given(method("GET"))
        .and(path("/results"))
        .respond_with(ResponseTemplate::new(200).set_body_string("well,od\nA1,0.42\n"))
        .expect(1)
        .mount(&server)
        .await;

    // WHEN: The assay runs without an export path
    let outcome = run_assay(
        config,
        "file:///protocols/elisa.ows",
        ExportFormat::Csv,
        None,
    )
    .await
    .expect("Assay should complete");

    // THEN: The service's result bytes come back
    assert_eq!(outcome, Some(b"well,od\nA1,0.42\n".to_vec()));
}

/// **VALUE**: Verifies that with an export path, results are written
/// remotely and nothing is fetched.
///
/// **WHY THIS MATTERS**: Export and fetch are alternatives; doing both would
/// double the transfer for large result sets and mask export failures behind
/// a successful fetch.
///
/// **BUG THIS CATCHES**: Would catch the workflow fetching results even when
/// an export path was given.
#[tokio::test]
async fn given_export_path_when_assay_run_then_export_only() {
    let (server, config) = start_mock_service().await;

    mount_ok(&server, "POST", "/lock").await;
    mount_ok(&server, "POST", "/unlock").await;
    mount_ok(&server, "PUT", "/workspace").await;
    mount_ok(&server, "POST", "/prepare").await;
    mount_ok(&server, "POST", "/readout").await;
    Mock::given(method("POST"))
        .and(path("/export"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/results"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = run_assay(
        config,
        "file:///protocols/elisa.ows",
        ExportFormat::Xlsx,
        Some("C:/data/run-042.xlsx"),
    )
    .await
    .expect("Assay should complete");

    assert_eq!(outcome, None);
}

/// **VALUE**: Verifies a mid-assay refusal still releases the lock and
/// surfaces the service's reason.
///
/// **WHY THIS MATTERS**: A crashed assay that keeps the lock blocks every
/// other client until the remote lease expires. Cleanup on the failure path
/// is the whole point of the lock bracketing.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The unlock request is skipped when a step fails
/// - The release outcome shadows the step's own error
#[tokio::test]
async fn given_failing_step_when_assay_run_then_lock_released_and_error_surfaced() {
    // GIVEN: A service that refuses preparation
    let (server, config) = start_mock_service().await;

    mount_ok(&server, "POST", "/lock").await;
    mount_ok(&server, "PUT", "/workspace").await;
    Mock::given(method("POST"))
        .and(path("/prepare"))
        .respond_with(ResponseTemplate::new(500).set_body_string("No plate inserted"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/unlock"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    // WHEN: The assay runs
    let result = run_assay(
        config,
        "file:///protocols/elisa.ows",
        ExportFormat::Csv,
        None,
    )
    .await;

    // THEN: The refusal reason surfaces; unlock expectation verified on drop
    match result {
        Err(SessionError::Invoker(InvokerError::RemoteRejected { message, .. })) => {
            assert!(
                message.contains("No plate inserted"),
                "Refusal reason missing: {message}"
            );
        }
        other => panic!("Expected remote rejection, got {other:?}"),
    }
}
