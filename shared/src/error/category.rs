//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Scan and session errors
/// - 3xxx: Membership and points errors
/// - 4xxx: Order errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Scan and session errors (2xxx)
    Scan,
    /// Membership errors (3xxx)
    Membership,
    /// Order errors (4xxx)
    Order,
    /// System errors (5xxx-9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Scan,
            3000..4000 => Self::Membership,
            4000..5000 => Self::Order,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Scan => "scan",
            Self::Membership => "membership",
            Self::Order => "order",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }

    /// Whether this error should force the operator back to the sign-in screen
    pub fn requires_sign_in(&self) -> bool {
        self.category() == ErrorCategory::Auth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1003), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Scan);
        assert_eq!(ErrorCategory::from_code(3002), ErrorCategory::Membership);
        assert_eq!(ErrorCategory::from_code(4002), ErrorCategory::Order);
        assert_eq!(ErrorCategory::from_code(9003), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::TokenExpired.category(), ErrorCategory::Auth);
        assert_eq!(ErrorCode::ScanRejected.category(), ErrorCategory::Scan);
        assert_eq!(ErrorCode::OrderSubmissionFailed.category(), ErrorCategory::Order);
        assert_eq!(ErrorCode::NetworkError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_requires_sign_in() {
        assert!(ErrorCode::TokenExpired.requires_sign_in());
        assert!(!ErrorCode::NetworkError.requires_sign_in());
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ErrorCategory::Membership).unwrap();
        assert_eq!(json, "\"membership\"");
    }
}
