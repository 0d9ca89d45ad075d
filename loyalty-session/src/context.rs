//! Resolved session context

use chrono::{DateTime, Utc};
use shared::models::{Meal, MembershipRecord, MembershipSummary, RestaurantInfo, registered_at};

/// Restaurant, membership and membership history for one scanned customer.
///
/// Only a fully successful resolution builds one.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    pub restaurant: RestaurantInfo,
    pub membership: MembershipSummary,
    pub history: Vec<MembershipRecord>,
}

impl SessionContext {
    pub fn new(
        restaurant: RestaurantInfo,
        membership: MembershipSummary,
        history: Vec<MembershipRecord>,
    ) -> Self {
        Self {
            restaurant,
            membership,
            history,
        }
    }

    /// Committed balance, before any tentative selection
    pub fn points(&self) -> i64 {
        self.membership.points
    }

    /// "Member since" date
    pub fn registered_at(&self) -> Option<DateTime<Utc>> {
        registered_at(&self.history)
    }

    pub fn currency_symbol(&self) -> &str {
        self.restaurant.currency_symbol()
    }

    /// Meals that can be redeemed with points, in menu order
    pub fn composable_meals(&self) -> impl Iterator<Item = &Meal> {
        self.restaurant.composable_meals()
    }
}
