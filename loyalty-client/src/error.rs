//! Client error types

use shared::ErrorCode;
use thiserror::Error;

use crate::credential::CredentialError;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connection, TLS, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Credential rejected by the server; the stored credential has been cleared
    #[error("Authentication required")]
    Unauthorized,

    /// Sign-in refused the email/password pair
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Server-side failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Credential store failure
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Whether the request never produced a usable HTTP reply
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Http(e) if !e.is_decode())
    }

    /// Whether the request ran out of time
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Http(e) if e.is_timeout())
    }

    /// Error code reported to the UI
    pub fn code(&self) -> ErrorCode {
        match self {
            ClientError::Http(e) if e.is_timeout() => ErrorCode::TimeoutError,
            ClientError::Http(e) if e.is_decode() => ErrorCode::MalformedResponse,
            ClientError::Http(_) => ErrorCode::NetworkError,
            ClientError::InvalidResponse(_) | ClientError::Serialization(_) => {
                ErrorCode::MalformedResponse
            }
            ClientError::Unauthorized => ErrorCode::TokenExpired,
            ClientError::InvalidCredentials => ErrorCode::InvalidCredentials,
            ClientError::Forbidden(_) => ErrorCode::PermissionDenied,
            ClientError::NotFound(_) => ErrorCode::NotFound,
            ClientError::Validation(_) => ErrorCode::ValidationFailed,
            ClientError::Internal(_) => ErrorCode::InternalError,
            ClientError::Credential(_) => ErrorCode::StorageError,
            ClientError::Config(_) => ErrorCode::ConfigError,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(ClientError::Unauthorized.code(), ErrorCode::TokenExpired);
        assert_eq!(
            ClientError::InvalidCredentials.code(),
            ErrorCode::InvalidCredentials
        );
        assert!(ClientError::InvalidCredentials.code().requires_sign_in());
        assert_eq!(
            ClientError::InvalidResponse("x".into()).code(),
            ErrorCode::MalformedResponse
        );
        assert_eq!(ClientError::NotFound("x".into()).code(), ErrorCode::NotFound);
        assert_eq!(ClientError::Internal("x".into()).code(), ErrorCode::InternalError);
    }

    #[test]
    fn test_non_http_errors_are_not_transport() {
        assert!(!ClientError::Unauthorized.is_transport());
        assert!(!ClientError::Internal("boom".into()).is_timeout());
    }
}
