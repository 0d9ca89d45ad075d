//! Points ledger
//!
//! The selection is the only stored state. Totals are recomputed from it on
//! every read, so they can never drift from what is selected.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use shared::models::RestaurantInfo;

use crate::context::SessionContext;
use crate::error::{SessionError, ValidationError};

/// Selected meal ids for the current context
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    selected: BTreeSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, meal_id: &str) -> bool {
        self.selected.contains(meal_id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    /// Copy with `meal_id` flipped
    fn toggled(&self, meal_id: &str) -> Self {
        let mut next = self.clone();
        if !next.selected.remove(meal_id) {
            next.selected.insert(meal_id.to_string());
        }
        next
    }
}

/// Totals implied by a selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderDraft {
    /// Σ price of selected meals
    pub total_price: Decimal,
    /// Σ pointsToBuy of selected meals
    pub points_delta: i64,
}

impl OrderDraft {
    /// Points to report on the create-order call
    pub fn used_points(&self) -> i64 {
        self.points_delta.abs()
    }
}

/// Derive totals from a selection. Ids that are not composable meals of the
/// restaurant contribute nothing.
///
/// Sums saturate. [`toggle`] never accepts a selection whose points overflow,
/// so for any selection held by a session the totals are exact.
pub fn draft(selection: &SelectionSet, restaurant: &RestaurantInfo) -> OrderDraft {
    selection
        .iter()
        .filter_map(|id| restaurant.find_composable(id))
        .fold(OrderDraft::default(), |acc, meal| OrderDraft {
            total_price: acc.total_price.saturating_add(meal.price),
            points_delta: acc
                .points_delta
                .saturating_add(meal.points_to_buy.unwrap_or_default()),
        })
}

/// Σ pointsToBuy of a selection, `None` on overflow
fn points_needed(selection: &SelectionSet, restaurant: &RestaurantInfo) -> Option<i64> {
    selection
        .iter()
        .filter_map(|id| restaurant.find_composable(id))
        .try_fold(0i64, |acc, meal| {
            acc.checked_add(meal.points_to_buy.unwrap_or_default())
        })
}

/// Balance left once the selection is paid for
pub fn available_points(context: &SessionContext, draft: &OrderDraft) -> i64 {
    context.points().saturating_sub(draft.points_delta)
}

/// Direction of an accepted toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Added,
    Removed,
}

/// Accepted toggle, for the advisory notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub meal_id: String,
    pub label: String,
    pub change: SelectionChange,
    pub draft: OrderDraft,
    pub available_points: i64,
}

/// Flip one meal.
///
/// Returns the new selection, or an error with the current selection left
/// untouched: [`ValidationError::UnknownMeal`] for ids that are not
/// composable, [`SessionError::InsufficientPoints`] when the balance would go
/// negative.
pub fn toggle(
    selection: &SelectionSet,
    context: &SessionContext,
    meal_id: &str,
) -> Result<(SelectionSet, ToggleOutcome), SessionError> {
    let meal = context
        .restaurant
        .find_composable(meal_id)
        .ok_or_else(|| ValidationError::UnknownMeal(meal_id.to_string()))?;

    let next = selection.toggled(meal_id);
    let available = points_needed(&next, &context.restaurant)
        .and_then(|needed| context.points().checked_sub(needed))
        .filter(|available| *available >= 0);

    let Some(available) = available else {
        let current = draft(selection, &context.restaurant);
        return Err(SessionError::InsufficientPoints {
            meal_id: meal.id.clone(),
            required: meal.points_to_buy.unwrap_or_default(),
            available: available_points(context, &current),
        });
    };
    let next_draft = draft(&next, &context.restaurant);

    let change = if next.contains(meal_id) {
        SelectionChange::Added
    } else {
        SelectionChange::Removed
    };
    let outcome = ToggleOutcome {
        meal_id: meal.id.clone(),
        label: meal.label.clone(),
        change,
        draft: next_draft,
        available_points: available,
    };
    Ok((next, outcome))
}
