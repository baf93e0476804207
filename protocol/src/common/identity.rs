//! Session user as reported by the identity service

use serde::{Deserialize, Serialize};

/// Authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identity-service user id
    pub uid: String,
    pub email: String,
}
