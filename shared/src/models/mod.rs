//! Domain models
//!
//! Validated forms of the records returned by the loyalty API. Wire payloads
//! live in [`crate::client`]; `loyalty-client` converts between the two.

pub mod membership;
pub mod order;
pub mod restaurant;

pub use membership::{MembershipRecord, MembershipSummary, registered_at};
pub use order::OrderReceipt;
pub use restaurant::{Meal, MenuGroup, RestaurantInfo, currency_symbol};
