use std::fmt::{Display, Formatter, Result as FormatResult};

use serde::Serialize;
use uuid::Uuid;

/// Opaque proof of exclusive instrument access.
///
/// The remote service is the source of truth for lock ownership; a token
/// is only evidence that *this* client acquired the lock at some point.
/// Tokens are never reused - every acquisition mints a fresh identifier,
/// so a token that survived a disconnect cannot be mistaken for a live one.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LockToken(Uuid);

impl LockToken {
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for LockToken {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(formatter, "{}", self.0)
    }
}
