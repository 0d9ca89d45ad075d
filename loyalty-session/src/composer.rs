//! Order composer: amount input, create-order request, and the result
//! reported after a successful submission

use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use shared::client::CreateOrderRequest;
use shared::models::OrderReceipt;

use crate::context::SessionContext;
use crate::error::ValidationError;
use crate::ledger::OrderDraft;

/// Partial input while typing: digits with at most one dot
fn editing_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]*\.?[0-9]*$").expect("static pattern"))
}

/// Complete amount: at least one digit, optional decimal part
fn amount_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([0-9]+\.?[0-9]*|\.[0-9]+)$").expect("static pattern"))
}

/// Accept an edit of the amount field, or reject it and keep the old text
pub fn accept_edit(text: &str) -> Result<String, ValidationError> {
    if editing_pattern().is_match(text) {
        Ok(text.to_string())
    } else {
        Err(ValidationError::InvalidAmount(text.to_string()))
    }
}

/// Parse the order amount typed by the operator
pub fn parse_amount(text: &str) -> Result<Decimal, ValidationError> {
    let invalid = || ValidationError::InvalidAmount(text.to_string());
    if !amount_pattern().is_match(text) {
        return Err(invalid());
    }

    // ".5" → "0.5", "12." → "12"
    let normalized = text.trim_end_matches('.');
    let normalized = if normalized.starts_with('.') {
        format!("0{}", normalized)
    } else {
        normalized.to_string()
    };
    normalized.parse::<Decimal>().map_err(|_| invalid())
}

/// Balance reported after an order of `amount`: committed points plus the
/// amount paid. Amounts that push the balance past `Decimal::MAX` are invalid.
pub fn balance_after(context: &SessionContext, amount: Decimal) -> Option<Decimal> {
    Decimal::from(context.points()).checked_add(amount)
}

/// Body of the create-order call. `price` is sent exactly as typed.
pub fn build_request(
    context: &SessionContext,
    draft: &OrderDraft,
    amount_text: &str,
) -> CreateOrderRequest {
    CreateOrderRequest {
        price: amount_text.to_string(),
        user_id: context.membership.user_id.clone(),
        restaurant_id: context.restaurant.id.clone(),
        used_points: draft.used_points().to_string(),
    }
}

/// Outcome of a created order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderResult {
    pub order_amount: Decimal,
    pub used_points: i64,
    /// Committed balance before the order
    pub previous_points: i64,
    /// `previous_points + order_amount`
    pub new_balance: Decimal,
    /// Balance reported by the server, when it sends one
    pub server_balance: Option<i64>,
    pub order_id: Option<String>,
    pub currency_symbol: String,
}

impl OrderResult {
    pub fn new(
        context: &SessionContext,
        draft: &OrderDraft,
        order_amount: Decimal,
        receipt: OrderReceipt,
    ) -> Self {
        let previous_points = context.points();
        Self {
            order_amount,
            used_points: draft.used_points(),
            previous_points,
            // begin_submit rejects amounts without a representable balance
            new_balance: Decimal::from(previous_points).saturating_add(order_amount),
            server_balance: receipt.points_balance,
            order_id: receipt.order_id,
            currency_symbol: context.currency_symbol().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{SelectionSet, draft, toggle};
    use crate::testing::scenario_a_context;

    #[test]
    fn test_accept_edit() {
        for ok in ["", "1", "15.", "15.5", ".5", "007"] {
            assert_eq!(accept_edit(ok).unwrap(), ok);
        }
        for bad in ["1.2.3", "abc", "-1", "1,5", " 1", "1e3"] {
            assert_eq!(
                accept_edit(bad),
                Err(ValidationError::InvalidAmount(bad.to_string()))
            );
        }
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("15.50").unwrap(), Decimal::new(1550, 2));
        assert_eq!(parse_amount("12.").unwrap(), Decimal::from(12));
        assert_eq!(parse_amount(".5").unwrap(), Decimal::new(5, 1));
        assert_eq!(parse_amount("0").unwrap(), Decimal::ZERO);

        for bad in ["", ".", "abc", "1.2.3", "-5", " 5"] {
            assert!(parse_amount(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_balance_after() {
        let ctx = scenario_a_context();
        assert_eq!(
            balance_after(&ctx, Decimal::new(1550, 2)),
            Some(Decimal::new(11550, 2))
        );

        // Decimal::MAX parses, but 100 more points do not fit
        let max = parse_amount("79228162514264337593543950335").unwrap();
        assert_eq!(max, Decimal::MAX);
        assert_eq!(balance_after(&ctx, max), None);
    }

    #[test]
    fn test_build_request() {
        let ctx = scenario_a_context();
        let (selection, _) = toggle(&SelectionSet::new(), &ctx, "a").unwrap();
        let d = draft(&selection, &ctx.restaurant);

        let req = build_request(&ctx, &d, "15.50");
        assert_eq!(req.price, "15.50");
        assert_eq!(req.user_id, "12");
        assert_eq!(req.restaurant_id, "7");
        assert_eq!(req.used_points, "30");

        let empty = build_request(&ctx, &OrderDraft::default(), "3");
        assert_eq!(empty.used_points, "0");
    }

    #[test]
    fn test_order_result_balance() {
        let ctx = scenario_a_context();
        let (selection, _) = toggle(&SelectionSet::new(), &ctx, "a").unwrap();
        let d = draft(&selection, &ctx.restaurant);

        let result = OrderResult::new(
            &ctx,
            &d,
            Decimal::new(1550, 2),
            OrderReceipt {
                order_id: Some("o-1".into()),
                points_balance: Some(85),
            },
        );
        assert_eq!(result.new_balance, Decimal::new(11550, 2));
        assert_eq!(result.used_points, 30);
        assert_eq!(result.previous_points, 100);
        assert_eq!(result.server_balance, Some(85));
        assert_eq!(result.currency_symbol, "€");
    }
}
