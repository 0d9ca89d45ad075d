//! Session error types
//!
//! Every error maps to an [`ErrorCode`] (前端负责本地化).

use loyalty_client::ClientError;
use shared::ErrorCode;
use thiserror::Error;

use crate::machine::PhaseKind;

/// Why a scanned code could not be turned into a session context
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("Membership code not found")]
    NotFound,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ResolutionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ResolutionError::NotFound => ErrorCode::ScanCodeNotFound,
            ResolutionError::Network(_) => ErrorCode::NetworkError,
            ResolutionError::MalformedResponse(_) => ErrorCode::MalformedResponse,
        }
    }
}

/// Rejected operator input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Code is empty")]
    EmptyCode,

    #[error("Invalid order amount: {0:?}")]
    InvalidAmount(String),

    #[error("Meal {0} is not on the menu or cannot be bought with points")]
    UnknownMeal(String),
}

impl ValidationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ValidationError::EmptyCode => ErrorCode::ScanCodeEmpty,
            ValidationError::InvalidAmount(_) => ErrorCode::OrderAmountInvalid,
            ValidationError::UnknownMeal(_) => ErrorCode::MealNotSelectable,
        }
    }
}

/// Session engine error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Another scan or submission is in flight
    #[error("A scan or submission is already in progress")]
    ScanRejected,

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Advisory: the toggle would drive the balance below zero
    #[error("Not enough points for meal {meal_id}: needs {required}, {available} available")]
    InsufficientPoints {
        meal_id: String,
        required: i64,
        available: i64,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Order submission failed: {0}")]
    OrderSubmission(String),

    /// The server rejected the cashier credential
    #[error("Session expired, please sign in again")]
    AuthExpired,

    #[error("{operation} is not allowed while {phase}")]
    InvalidState {
        operation: &'static str,
        phase: PhaseKind,
    },

    /// A completion arrived for a resolution or submission that is no longer current
    #[error("Result discarded, the session was reset")]
    Superseded,
}

impl SessionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::ScanRejected => ErrorCode::ScanRejected,
            SessionError::Resolution(e) => e.code(),
            SessionError::InsufficientPoints { .. } => ErrorCode::InsufficientPoints,
            SessionError::Validation(e) => e.code(),
            SessionError::OrderSubmission(_) => ErrorCode::OrderSubmissionFailed,
            SessionError::AuthExpired => ErrorCode::TokenExpired,
            SessionError::InvalidState { .. } => ErrorCode::InvalidSessionState,
            SessionError::Superseded => ErrorCode::SessionSuperseded,
        }
    }

    /// Informational errors that leave the session fully usable
    pub fn is_advisory(&self) -> bool {
        matches!(self, SessionError::InsufficientPoints { .. })
    }

    /// Auth-category failures drop the cashier back to sign-in
    pub fn requires_sign_in(&self) -> bool {
        self.code().requires_sign_in()
    }

    /// Classify a failed lookup step
    pub(crate) fn from_lookup(err: ClientError) -> Self {
        match err {
            ClientError::Unauthorized => SessionError::AuthExpired,
            ClientError::NotFound(_) | ClientError::Validation(_) => {
                ResolutionError::NotFound.into()
            }
            ClientError::InvalidResponse(msg) => ResolutionError::MalformedResponse(msg).into(),
            ClientError::Serialization(e) => {
                ResolutionError::MalformedResponse(e.to_string()).into()
            }
            ClientError::Http(e) if e.is_decode() => {
                ResolutionError::MalformedResponse(e.to_string()).into()
            }
            other => ResolutionError::Network(other.to_string()).into(),
        }
    }

    /// Classify a failed create-order call
    pub(crate) fn from_submission(err: ClientError) -> Self {
        match err {
            ClientError::Unauthorized => SessionError::AuthExpired,
            other => SessionError::OrderSubmission(other.to_string()),
        }
    }
}
