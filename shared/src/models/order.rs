//! Order models

use serde::{Deserialize, Serialize};

/// Outcome of a create-order call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: Option<String>,
    /// Balance reported by the server, when the reply carries one
    pub points_balance: Option<i64>,
}
