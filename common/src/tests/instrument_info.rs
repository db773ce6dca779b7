use crate::{InstrumentInfoBuilder, ModelError};

fn complete_builder() -> InstrumentInfoBuilder {
    InstrumentInfoBuilder::default()
        .with_pid(4242)
        .with_port(50051)
        .with_base_url("http://127.0.0.1:50051")
        .with_name("absorbance96app")
        .with_command("absorbance96app --remote")
        .with_owned(true)
}

/// **VALUE**: Verifies a fully specified builder produces a valid record.
///
/// **BUG THIS CATCHES**: Would catch a validation rule accidentally rejecting
/// well-formed launcher/discovery output.
#[test]
fn given_complete_builder_when_built_then_returns_instrument_info() {
    // GIVEN: A builder with all fields set
    let info = complete_builder().build().unwrap();

    // THEN: Fields are carried through unchanged
    assert_eq!(info.pid, 4242);
    assert_eq!(info.port, 50051);
    assert_eq!(info.base_url, "http://127.0.0.1:50051");
    assert_eq!(info.name, "absorbance96app");
    assert!(info.owned);
}

/// **VALUE**: Verifies that builder validation rejects zero PIDs.
///
/// **WHY THIS MATTERS**: PID 0 is an invalid process ID on all platforms.
/// Allowing it would break process tracking and shutdown throughout the system.
///
/// **BUG THIS CATCHES**: Would catch the PID zero check being deleted during
/// refactoring, letting corrupted records enter the system.
#[test]
fn given_zero_pid_when_building_then_returns_validation_error() {
    // GIVEN: Builder with PID set to zero
    let result = complete_builder().with_pid(0).build();

    // THEN: Should return validation error
    match result.unwrap_err() {
        ModelError::Validation { message, .. } => {
            assert_eq!(message, "PID must be non-zero");
        }
    }
}

/// **VALUE**: Verifies that builder validation rejects non-HTTP base URLs.
///
/// **WHY THIS MATTERS**: The base URL is handed to the channel provider; a
/// malformed one would fail later with a connectivity error that hides the
/// real cause.
///
/// **BUG THIS CATCHES**: Would catch removal of the scheme prefix check.
#[test]
fn given_schemeless_base_url_when_building_then_returns_validation_error() {
    // GIVEN: Builder with a base URL missing its scheme
    let result = complete_builder().with_base_url("127.0.0.1:50051").build();

    // THEN: Should return validation error
    assert!(result.is_err());
}

/// **VALUE**: Verifies that the base URL must agree with the service port.
///
/// **WHY THIS MATTERS**: Launcher and discovery both record the port and a
/// dialable base URL for the same service. If the two ever disagree, one
/// consumer connects to the instrument and another to nothing.
///
/// **BUG THIS CATCHES**: Would catch a base URL being assembled from a
/// different port than the one recorded (say, a default leaking in).
#[test]
fn given_base_url_port_mismatch_when_building_then_returns_validation_error() {
    // GIVEN: Builder whose base URL names a different port
    let result = complete_builder()
        .with_base_url("http://127.0.0.1:50052")
        .build();

    // THEN: Should return validation error naming both ports
    match result.unwrap_err() {
        ModelError::Validation { message, .. } => {
            assert!(message.contains("50052"), "Got: {message}");
            assert!(message.contains("50051"), "Got: {message}");
        }
    }
}

/// **VALUE**: Verifies that builder validation rejects port zero.
///
/// **BUG THIS CATCHES**: Would catch an unbound or uninitialized port value
/// being recorded as a reachable service.
#[test]
fn given_zero_port_when_building_then_returns_validation_error() {
    let result = complete_builder().with_port(0).build();

    match result.unwrap_err() {
        ModelError::Validation { message, .. } => {
            assert!(message.contains("non-zero"), "Got: {message}");
        }
    }
}

/// **VALUE**: Verifies that required fields cannot be omitted.
///
/// **BUG THIS CATCHES**: Would catch the builder allowing incomplete
/// construction after a field is added or made optional by mistake.
#[test]
fn given_missing_pid_when_building_then_returns_validation_error() {
    // GIVEN: Builder without PID
    let result = InstrumentInfoBuilder::default()
        .with_port(50051)
        .with_base_url("http://127.0.0.1:50051")
        .with_name("absorbance96app")
        .with_command("absorbance96app --remote")
        .with_owned(true)
        .build();

    // THEN: Should return validation error
    assert!(result.is_err());
}
