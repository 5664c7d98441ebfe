//! Caller identity passed explicitly into every user-facing operation.
//!
//! Authentication happens outside this crate; by the time an operation runs the caller
//! is known and carried in a [`Session`].

use serde::{Deserialize, Serialize};

/// The authenticated caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Profile id of the caller
    pub user_id: String,
}

impl Session {
    /// Creates a session for the given profile id.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    /// Returns true when the session belongs to `user_id`.
    #[must_use]
    pub fn is(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}
