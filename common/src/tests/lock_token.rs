use crate::LockToken;

use uuid::Uuid;

/// **VALUE**: Verifies that every acquisition mints a distinct token.
///
/// **WHY THIS MATTERS**: The session re-acquires the lock after releases and
/// reconnects. If tokens were ever reused, a stale token from before a
/// connection loss could be mistaken for a live one and sent to the service.
///
/// **BUG THIS CATCHES**: Would catch `fresh()` returning a cached or constant
/// identifier instead of generating a new one per call.
#[test]
fn given_two_fresh_tokens_when_compared_then_they_differ() {
    // GIVEN/WHEN: Two freshly minted tokens
    let first = LockToken::fresh();
    let second = LockToken::fresh();

    // THEN: They must not be equal
    assert_ne!(first, second, "Fresh tokens must be distinct");
}

/// **VALUE**: Verifies Display is the one rendering of the token and yields
/// a well-formed UUID.
///
/// **BUG THIS CATCHES**: Would catch a Display change (or a second,
/// diverging accessor creeping back in) that sends a malformed or empty lock
/// identifier to the service, which would be accepted locally but rejected
/// remotely with a confusing fault.
#[test]
fn given_fresh_token_when_rendered_then_is_a_uuid() {
    let token = LockToken::fresh();

    let rendered = token.to_string();
    assert!(
        Uuid::parse_str(&rendered).is_ok(),
        "Rendered token must be a UUID: {rendered}"
    );
}
