//! Notices broadcast to UI collaborators

use shared::ErrorCode;

use crate::composer::OrderResult;
use crate::error::SessionError;
use crate::ledger::ToggleOutcome;
use crate::machine::PhaseKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    PhaseChanged {
        from: PhaseKind,
        to: PhaseKind,
    },
    /// A code resolved into a context
    Resolved {
        restaurant_id: String,
        membership_code: String,
        points: i64,
    },
    /// A meal was added to or removed from the selection
    SelectionChanged(ToggleOutcome),
    OrderCreated(OrderResult),
    /// Any failure, surfaced once. Advisory errors use the same notice.
    Failed(SessionError),
    /// The cashier credential is gone; the UI should show the sign-in screen
    SignedOut,
}

impl Notice {
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Notice::Failed(error) => Some(error.code()),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Notice::Failed(error) if !error.is_advisory())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let notice = Notice::Failed(SessionError::ScanRejected);
        assert_eq!(notice.error_code(), Some(ErrorCode::ScanRejected));
        assert!(notice.is_failure());
        assert_eq!(Notice::SignedOut.error_code(), None);
    }

    #[test]
    fn test_advisory_is_not_failure() {
        let notice = Notice::Failed(SessionError::InsufficientPoints {
            meal_id: "b".into(),
            required: 80,
            available: 70,
        });
        assert!(!notice.is_failure());
        assert_eq!(notice.error_code(), Some(ErrorCode::InsufficientPoints));
    }
}
