//! Membership models (会员积分)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Loyalty record of one user at one restaurant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipSummary {
    pub code: String,
    /// Committed point balance, never negative
    pub points: i64,
    pub user_id: String,
    pub restaurant_id: String,
}

/// One entry of a user's membership history, most recent first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipRecord {
    pub id: Option<String>,
    pub restaurant_id: Option<String>,
    pub points: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Registration timestamp carried by the first history record
pub fn registered_at(history: &[MembershipRecord]) -> Option<DateTime<Utc>> {
    history.first().map(|record| record.created_at)
}
