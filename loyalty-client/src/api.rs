//! The loyalty backend as seen by the session engine

use async_trait::async_trait;
use shared::client::{
    CodeLookupResponse, CreateOrderRequest, CreateOrderResponse, MembershipRecordDto,
    RestaurantLookupResponse,
};
use shared::models::{MembershipRecord, MembershipSummary, OrderReceipt, RestaurantInfo};
use shared::ScanCode;

use crate::convert;
use crate::{ClientResult, LoyaltyHttpClient};

/// Result of resolving a scanned code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeLookup {
    pub restaurant_id: String,
    pub user_id: String,
}

/// Restaurant detail plus the membership stub for one customer
#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantLookup {
    pub restaurant: RestaurantInfo,
    pub membership: MembershipSummary,
}

/// Remote operations needed by a loyalty session.
///
/// Implementations attach the cashier credential themselves; callers never
/// see tokens.
#[async_trait]
pub trait LoyaltyApi: Send + Sync {
    /// `GET /restaurantByCode/{code}`
    async fn lookup_code(&self, code: &ScanCode) -> ClientResult<CodeLookup>;

    /// `GET /restaurant/{restaurantId}/{userId}`
    async fn lookup_restaurant(
        &self,
        restaurant_id: &str,
        user_id: &str,
    ) -> ClientResult<RestaurantLookup>;

    /// `GET /membership/{userId}`, in server order
    async fn lookup_membership_history(&self, user_id: &str) -> ClientResult<Vec<MembershipRecord>>;

    /// `POST /order/create`
    async fn create_order(&self, request: &CreateOrderRequest) -> ClientResult<OrderReceipt>;

    /// Forget the cashier credential
    async fn sign_out(&self) -> ClientResult<()>;
}

#[async_trait]
impl LoyaltyApi for LoyaltyHttpClient {
    async fn lookup_code(&self, code: &ScanCode) -> ClientResult<CodeLookup> {
        let dto: CodeLookupResponse = self.get(&["restaurantByCode", code.as_str()]).await?;
        convert::code_lookup(dto)
    }

    async fn lookup_restaurant(
        &self,
        restaurant_id: &str,
        user_id: &str,
    ) -> ClientResult<RestaurantLookup> {
        let dto: RestaurantLookupResponse =
            self.get(&["restaurant", restaurant_id, user_id]).await?;
        convert::restaurant_lookup(dto)
    }

    async fn lookup_membership_history(
        &self,
        user_id: &str,
    ) -> ClientResult<Vec<MembershipRecord>> {
        let dtos: Vec<MembershipRecordDto> = self.get(&["membership", user_id]).await?;
        convert::membership_history(dtos)
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> ClientResult<OrderReceipt> {
        let body = self.post_raw(&["order", "create"], request).await?;
        if body.trim().is_empty() {
            return Ok(OrderReceipt::default());
        }
        // 订单已创建：回复格式异常也不能让收银员重复下单
        match serde_json::from_str::<CreateOrderResponse>(&body) {
            Ok(dto) => Ok(convert::order_receipt(dto)),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Unrecognized create-order reply, order assumed created"
                );
                Ok(OrderReceipt::default())
            }
        }
    }

    async fn sign_out(&self) -> ClientResult<()> {
        LoyaltyHttpClient::sign_out(self)
    }
}
