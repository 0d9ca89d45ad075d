//! Wire payloads of the loyalty API
//!
//! These mirror the JSON the backend actually sends: every field is optional
//! and loosely typed, because ids and prices arrive either as numbers or as
//! strings. `loyalty-client` validates them into [`crate::models`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Loose scalars
// =============================================================================

/// A JSON value that may be sent as a number or as a string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    /// Identifier form: numbers rendered in decimal, strings trimmed, blank rejected
    pub fn as_id(&self) -> Option<String> {
        match self {
            Scalar::Number(n) => Some(n.to_string()),
            Scalar::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
        }
    }

    /// Exact decimal form
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Scalar::Number(n) => n.to_string().parse().ok(),
            Scalar::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Whole number form. `"30"` and `30` are accepted, `30.5` is not.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Scalar::Number(n) => n.as_i64(),
            Scalar::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Empty string, the backend's way of saying "not set"
    pub fn is_blank(&self) -> bool {
        matches!(self, Scalar::Text(s) if s.trim().is_empty())
    }
}

// =============================================================================
// Lookup DTOs
// =============================================================================

/// `GET /restaurantByCode/{code}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeLookupResponse {
    #[serde(default)]
    pub membership: Option<MembershipRef>,
}

/// Membership pointer returned by the code lookup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MembershipRef {
    #[serde(default)]
    pub restaurant: Option<Scalar>,
    #[serde(default)]
    pub user: Option<Scalar>,
}

/// `GET /restaurant/{restaurantId}/{userId}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestaurantLookupResponse {
    #[serde(default)]
    pub restaurant: Option<RestaurantDto>,
    #[serde(default)]
    pub membership: Option<MembershipDto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestaurantDto {
    #[serde(default)]
    pub id: Option<Scalar>,
    #[serde(default)]
    pub currency: Option<CurrencyDto>,
    #[serde(default)]
    pub menu: Option<MenuDto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrencyDto {
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuDto {
    #[serde(default)]
    pub menu_groups: Option<Vec<MenuGroupDto>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuGroupDto {
    #[serde(default)]
    pub id: Option<Scalar>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub meals: Option<Vec<MealDto>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealDto {
    #[serde(default)]
    pub id: Option<Scalar>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub price: Option<Scalar>,
    #[serde(default)]
    pub points_to_buy: Option<Scalar>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MembershipDto {
    #[serde(default)]
    pub code: Option<Scalar>,
    #[serde(default)]
    pub points: Option<Scalar>,
    #[serde(default)]
    pub user: Option<Scalar>,
    #[serde(default)]
    pub restaurant: Option<Scalar>,
}

/// One element of `GET /membership/{userId}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRecordDto {
    #[serde(default)]
    pub id: Option<Scalar>,
    #[serde(default)]
    pub restaurant: Option<Scalar>,
    #[serde(default)]
    pub points: Option<Scalar>,
    #[serde(default)]
    pub created_at: Option<String>,
}

// =============================================================================
// Order and auth DTOs
// =============================================================================

/// `POST /order/create`
///
/// The backend expects every field as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Order amount exactly as typed by the operator
    pub price: String,
    pub user_id: String,
    pub restaurant_id: String,
    pub used_points: String,
}

/// Reply of `POST /order/create`. Older backends answer with an empty body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    #[serde(default)]
    pub id: Option<Scalar>,
    #[serde(default)]
    pub points: Option<Scalar>,
    #[serde(default)]
    pub membership: Option<MembershipDto>,
}

/// `POST /users/cashier/signin`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// `POST /users/forgotPassword`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}
