//! Unified error codes
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Scan and session errors
//! - 3xxx: Membership and points errors
//! - 4xxx: Order errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 on the wire so the UI can map codes to translated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,

    // ==================== 1xxx: Auth ====================
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired or was revoked
    TokenExpired = 1003,
    /// Permission denied
    PermissionDenied = 1004,

    // ==================== 2xxx: Scan ====================
    /// Another scan or submission is in flight
    ScanRejected = 2001,
    /// Scanned or typed code is empty
    ScanCodeEmpty = 2002,
    /// Code does not match any membership
    ScanCodeNotFound = 2003,
    /// Operation not allowed in the current session phase
    InvalidSessionState = 2004,
    /// Completion arrived after the session was reset
    SessionSuperseded = 2005,

    // ==================== 3xxx: Membership ====================
    /// Not enough points for the selection
    InsufficientPoints = 3002,
    /// Meal cannot be bought with points
    MealNotSelectable = 3004,

    // ==================== 4xxx: Order ====================
    /// Order amount is empty or not numeric
    OrderAmountInvalid = 4001,
    /// Remote order creation failed
    OrderSubmissionFailed = 4002,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Network error
    NetworkError = 9003,
    /// Timeout error
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Server reply is missing fields or cannot be decoded
    MalformedResponse = 9006,
    /// Local credential storage failed
    StorageError = 9007,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",

            // Auth
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Session expired, please sign in again",
            ErrorCode::PermissionDenied => "Permission denied",

            // Scan
            ErrorCode::ScanRejected => "A scan is already being processed",
            ErrorCode::ScanCodeEmpty => "Code is empty",
            ErrorCode::ScanCodeNotFound => "Invalid code",
            ErrorCode::InvalidSessionState => "Operation not allowed right now",
            ErrorCode::SessionSuperseded => "Result discarded after session reset",

            // Membership
            ErrorCode::InsufficientPoints => "Not enough points to select this meal",
            ErrorCode::MealNotSelectable => "Meal cannot be bought with points",

            // Order
            ErrorCode::OrderAmountInvalid => "Order amount is invalid",
            ErrorCode::OrderSubmissionFailed => {
                "Failed to create order at this moment, please try again"
            }

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::MalformedResponse => "Unexpected server response",
            ErrorCode::StorageError => "Credential storage error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),

            // Auth
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::PermissionDenied),

            // Scan
            2001 => Ok(ErrorCode::ScanRejected),
            2002 => Ok(ErrorCode::ScanCodeEmpty),
            2003 => Ok(ErrorCode::ScanCodeNotFound),
            2004 => Ok(ErrorCode::InvalidSessionState),
            2005 => Ok(ErrorCode::SessionSuperseded),

            // Membership
            3002 => Ok(ErrorCode::InsufficientPoints),
            3004 => Ok(ErrorCode::MealNotSelectable),

            // Order
            4001 => Ok(ErrorCode::OrderAmountInvalid),
            4002 => Ok(ErrorCode::OrderSubmissionFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9006 => Ok(ErrorCode::MalformedResponse),
            9007 => Ok(ErrorCode::StorageError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
