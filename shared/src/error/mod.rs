//! Unified error codes for the loyalty scan POS
//!
//! Every failure the engine reports to the operator carries an [`ErrorCode`],
//! so the UI collaborator can localize the message without parsing strings.
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Scan and session errors
//! - 3xxx: Membership and points errors
//! - 4xxx: Order errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{ErrorCategory, ErrorCode};
//!
//! let code = ErrorCode::InsufficientPoints;
//! assert_eq!(code.code(), 3002);
//! assert_eq!(code.category(), ErrorCategory::Membership);
//! ```

mod category;
mod codes;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
