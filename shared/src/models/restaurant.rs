//! Restaurant and menu models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Restaurant detail resolved from a membership code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantInfo {
    pub id: String,
    /// ISO currency code (EUR, USD, MAD, ...). Absent when the restaurant has none configured.
    pub currency_code: Option<String>,
    pub menu_groups: Vec<MenuGroup>,
}

/// Menu section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuGroup {
    pub id: Option<String>,
    pub label: Option<String>,
    pub meals: Vec<Meal>,
}

/// Menu item (餐品)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: String,
    pub label: String,
    /// Non-negative unit price
    pub price: Decimal,
    /// Points needed to redeem this meal. `None` means the meal cannot be bought with points.
    pub points_to_buy: Option<i64>,
}

impl Meal {
    /// Whether the meal can be added to a points redemption
    pub fn is_selectable(&self) -> bool {
        self.points_to_buy.is_some()
    }
}

impl RestaurantInfo {
    /// All meals across menu groups, in menu order
    pub fn meals(&self) -> impl Iterator<Item = &Meal> {
        self.menu_groups.iter().flat_map(|group| group.meals.iter())
    }

    /// Meals that carry a points price, in menu order
    pub fn composable_meals(&self) -> impl Iterator<Item = &Meal> {
        self.meals().filter(|meal| meal.is_selectable())
    }

    /// Find a selectable meal by id
    pub fn find_composable(&self, meal_id: &str) -> Option<&Meal> {
        self.composable_meals().find(|meal| meal.id == meal_id)
    }

    /// Display symbol for the restaurant currency
    pub fn currency_symbol(&self) -> &str {
        self.currency_code.as_deref().map(currency_symbol).unwrap_or("")
    }
}

/// Map a currency code to the symbol shown next to prices.
///
/// Unknown codes are displayed as-is.
pub fn currency_symbol(code: &str) -> &str {
    match code {
        "EUR" => "€",
        "USD" => "$",
        "MAD" => "DH",
        other => other,
    }
}
