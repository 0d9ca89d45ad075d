//! Fixtures shared by unit tests

use rust_decimal::Decimal;
use shared::models::{Meal, MembershipSummary, MenuGroup, RestaurantInfo};

use crate::context::SessionContext;

fn meal(id: &str, label: &str, price: Decimal, points: Option<i64>) -> Meal {
    Meal {
        id: id.to_string(),
        label: label.to_string(),
        price,
        points_to_buy: points,
    }
}

/// A (30 pts, 10), B (80 pts, 20), C (0 pts, 4.50), tea (not redeemable, 2)
pub(crate) fn context_with_points(points: i64) -> SessionContext {
    let restaurant = RestaurantInfo {
        id: "7".to_string(),
        currency_code: Some("EUR".to_string()),
        menu_groups: vec![
            MenuGroup {
                id: Some("1".to_string()),
                label: Some("Mains".to_string()),
                meals: vec![
                    meal("a", "Meal A", Decimal::from(10), Some(30)),
                    meal("b", "Meal B", Decimal::from(20), Some(80)),
                ],
            },
            MenuGroup {
                id: Some("2".to_string()),
                label: Some("Extras".to_string()),
                meals: vec![
                    meal("c", "Meal C", Decimal::new(450, 2), Some(0)),
                    meal("tea", "Tea", Decimal::from(2), None),
                ],
            },
        ],
    };
    let membership = MembershipSummary {
        code: "MBR-1".to_string(),
        points,
        user_id: "12".to_string(),
        restaurant_id: "7".to_string(),
    };
    SessionContext::new(restaurant, membership, Vec::new())
}

pub(crate) fn scenario_a_context() -> SessionContext {
    context_with_points(100)
}
