//! Shared types for the loyalty scan POS
//!
//! Domain models, wire payloads and the unified error code table used by
//! `loyalty-client`, `loyalty-session` and the operator console.

pub mod client;
pub mod error;
pub mod models;
pub mod scan;

// Re-exports
pub use error::{ErrorCategory, ErrorCode};
pub use models::{
    Meal, MembershipRecord, MembershipSummary, MenuGroup, OrderReceipt, RestaurantInfo,
};
pub use scan::{ScanCode, ScanCodeError};
pub use serde::{Deserialize, Serialize};
