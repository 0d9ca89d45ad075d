//! Wire payload → domain model conversion
//!
//! The backend sends loosely-typed JSON. Anything missing or out of range is
//! reported as [`ClientError::InvalidResponse`] so the engine can surface a
//! single `MalformedResponse` instead of failing later on a half-built model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::client::{
    CodeLookupResponse, CreateOrderResponse, MealDto, MembershipDto, MembershipRecordDto,
    MenuGroupDto, RestaurantLookupResponse, Scalar,
};
use shared::models::{
    Meal, MembershipRecord, MembershipSummary, MenuGroup, OrderReceipt, RestaurantInfo,
};

use crate::api::{CodeLookup, RestaurantLookup};
use crate::error::{ClientError, ClientResult};

fn malformed(message: impl Into<String>) -> ClientError {
    ClientError::InvalidResponse(message.into())
}

fn require_id(value: Option<&Scalar>, field: &str) -> ClientResult<String> {
    value
        .and_then(Scalar::as_id)
        .ok_or_else(|| malformed(format!("missing {}", field)))
}

fn optional_id(value: Option<&Scalar>) -> Option<String> {
    value.and_then(Scalar::as_id)
}

fn non_negative_points(value: Option<&Scalar>, field: &str) -> ClientResult<i64> {
    let points = value
        .and_then(Scalar::as_integer)
        .ok_or_else(|| malformed(format!("missing or non-integer {}", field)))?;
    if points < 0 {
        return Err(malformed(format!("{} must be non-negative, got {}", field, points)));
    }
    Ok(points)
}

/// Step 1: `{ membership: { restaurant, user } }`
pub fn code_lookup(dto: CodeLookupResponse) -> ClientResult<CodeLookup> {
    let membership = dto
        .membership
        .ok_or_else(|| malformed("code lookup without membership"))?;
    Ok(CodeLookup {
        restaurant_id: require_id(membership.restaurant.as_ref(), "membership.restaurant")?,
        user_id: require_id(membership.user.as_ref(), "membership.user")?,
    })
}

/// Step 2: restaurant detail and membership stub
pub fn restaurant_lookup(dto: RestaurantLookupResponse) -> ClientResult<RestaurantLookup> {
    let restaurant = dto
        .restaurant
        .ok_or_else(|| malformed("restaurant lookup without restaurant"))?;
    let membership = dto
        .membership
        .ok_or_else(|| malformed("restaurant lookup without membership"))?;

    let menu_groups = restaurant
        .menu
        .and_then(|menu| menu.menu_groups)
        .unwrap_or_default()
        .into_iter()
        .map(menu_group)
        .collect::<ClientResult<Vec<_>>>()?;

    let info = RestaurantInfo {
        id: require_id(restaurant.id.as_ref(), "restaurant.id")?,
        currency_code: restaurant
            .currency
            .and_then(|c| c.code)
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty()),
        menu_groups,
    };

    Ok(RestaurantLookup {
        membership: membership_summary(membership)?,
        restaurant: info,
    })
}

fn menu_group(dto: MenuGroupDto) -> ClientResult<MenuGroup> {
    Ok(MenuGroup {
        id: optional_id(dto.id.as_ref()),
        label: dto.label,
        meals: dto
            .meals
            .unwrap_or_default()
            .into_iter()
            .map(meal)
            .collect::<ClientResult<Vec<_>>>()?,
    })
}

fn meal(dto: MealDto) -> ClientResult<Meal> {
    let id = require_id(dto.id.as_ref(), "meal.id")?;
    let label = dto
        .label
        .ok_or_else(|| malformed(format!("meal {} has no label", id)))?;

    let price: Decimal = dto
        .price
        .as_ref()
        .and_then(Scalar::as_decimal)
        .ok_or_else(|| malformed(format!("meal {} has no valid price", id)))?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(malformed(format!("meal {} has negative price {}", id, price)));
    }

    // null, absent and "" all mean "not redeemable"
    let points_to_buy = match dto.points_to_buy.as_ref() {
        None => None,
        Some(scalar) if scalar.is_blank() => None,
        Some(scalar) => Some(non_negative_points(
            Some(scalar),
            &format!("meal {} pointsToBuy", id),
        )?),
    };

    Ok(Meal {
        id,
        label,
        price,
        points_to_buy,
    })
}

fn membership_summary(dto: MembershipDto) -> ClientResult<MembershipSummary> {
    Ok(MembershipSummary {
        code: require_id(dto.code.as_ref(), "membership.code")?,
        points: non_negative_points(dto.points.as_ref(), "membership.points")?,
        user_id: require_id(dto.user.as_ref(), "membership.user")?,
        restaurant_id: require_id(dto.restaurant.as_ref(), "membership.restaurant")?,
    })
}

/// Step 3: membership history, order preserved
pub fn membership_history(dtos: Vec<MembershipRecordDto>) -> ClientResult<Vec<MembershipRecord>> {
    dtos.into_iter().map(membership_record).collect()
}

fn membership_record(dto: MembershipRecordDto) -> ClientResult<MembershipRecord> {
    let raw = dto
        .created_at
        .ok_or_else(|| malformed("membership record without createdAt"))?;
    let created_at = DateTime::parse_from_rfc3339(raw.trim())
        .map_err(|e| malformed(format!("invalid createdAt {:?}: {}", raw, e)))?
        .with_timezone(&Utc);

    Ok(MembershipRecord {
        id: optional_id(dto.id.as_ref()),
        restaurant_id: optional_id(dto.restaurant.as_ref()),
        points: dto.points.as_ref().and_then(Scalar::as_integer),
        created_at,
    })
}

/// Create-order reply; every field is optional
pub fn order_receipt(dto: CreateOrderResponse) -> OrderReceipt {
    let points_balance = dto
        .points
        .as_ref()
        .or_else(|| dto.membership.as_ref().and_then(|m| m.points.as_ref()))
        .and_then(Scalar::as_integer);

    OrderReceipt {
        order_id: optional_id(dto.id.as_ref()),
        points_balance,
    }
}
