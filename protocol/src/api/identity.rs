//! Identity service DTOs
//!
//! Bodies for the `accounts:signUp` and `accounts:signInWithPassword`
//! endpoints. Field names follow the service's camelCase convention.

use serde::{Deserialize, Serialize};

pub use crate::common::User;

// ============================================================================
// Password authentication
// ============================================================================

/// Email/password request used for both sign-up and sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordAuthRequest {
    pub email: String,
    pub password: String,
    /// Ask the service to return an id token and refresh token
    pub return_secure_token: bool,
}

impl PasswordAuthRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            return_secure_token: true,
        }
    }
}

/// Successful sign-up / sign-in response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordAuthResponse {
    pub local_id: String,
    pub email: String,
    pub id_token: String,
    pub refresh_token: String,
    /// Token lifetime in seconds, sent as a string
    pub expires_in: String,
}

impl PasswordAuthResponse {
    pub fn user(&self) -> User {
        User {
            uid: self.local_id.clone(),
            email: self.email.clone(),
        }
    }

    /// Token lifetime in seconds; falls back to one hour when unparsable
    pub fn expires_in_secs(&self) -> i64 {
        self.expires_in.trim().parse().unwrap_or(3600)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Error envelope returned with non-2xx statuses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityErrorResponse {
    pub error: IdentityErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityErrorBody {
    pub code: u16,
    /// Machine-readable reason such as `EMAIL_EXISTS` or `INVALID_PASSWORD`
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_camel_case() {
        let body = serde_json::to_value(PasswordAuthRequest::new("a@b.io", "pw")).unwrap();
        assert_eq!(body["returnSecureToken"], true);
        assert_eq!(body["email"], "a@b.io");
    }

    #[test]
    fn test_response_parses_expiry() {
        let raw = r#"{"localId":"u1","email":"a@b.io","idToken":"t","refreshToken":"r","expiresIn":"3600"}"#;
        let resp: PasswordAuthResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.expires_in_secs(), 3600);
        assert_eq!(resp.user().uid, "u1");
    }
}
