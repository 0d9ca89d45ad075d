//! Code resolver: scanned code → restaurant → membership history
//!
//! The three lookups depend on each other and are committed together. The
//! resolver touches no session state; a failure at any step simply drops
//! whatever the earlier steps produced.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use loyalty_client::{ClientResult, LoyaltyApi};
use shared::ScanCode;

use crate::context::SessionContext;
use crate::error::{ResolutionError, SessionError};

pub struct CodeResolver<A: ?Sized> {
    api: Arc<A>,
    step_timeout: Duration,
}

impl<A: LoyaltyApi + ?Sized> CodeResolver<A> {
    pub fn new(api: Arc<A>, step_timeout: Duration) -> Self {
        Self { api, step_timeout }
    }

    /// Run all three lookups; the context exists only if every one succeeds
    pub async fn resolve(&self, code: &ScanCode) -> Result<SessionContext, SessionError> {
        tracing::debug!(code = %code, "Resolving membership code");
        let lookup = self
            .step("lookup-by-code", self.api.lookup_code(code))
            .await?;

        tracing::debug!(
            restaurant_id = %lookup.restaurant_id,
            user_id = %lookup.user_id,
            "Looking up restaurant"
        );
        let detail = self
            .step(
                "lookup-restaurant",
                self.api
                    .lookup_restaurant(&lookup.restaurant_id, &lookup.user_id),
            )
            .await?;

        tracing::debug!(user_id = %lookup.user_id, "Looking up membership history");
        let history = self
            .step(
                "lookup-membership-history",
                self.api.lookup_membership_history(&lookup.user_id),
            )
            .await?;

        Ok(SessionContext::new(
            detail.restaurant,
            detail.membership,
            history,
        ))
    }

    async fn step<T>(
        &self,
        name: &'static str,
        call: impl Future<Output = ClientResult<T>>,
    ) -> Result<T, SessionError> {
        match tokio::time::timeout(self.step_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::debug!(step = name, error = %e, "Lookup failed");
                Err(SessionError::from_lookup(e))
            }
            Err(_) => {
                tracing::debug!(
                    step = name,
                    timeout_ms = self.step_timeout.as_millis() as u64,
                    "Lookup timed out"
                );
                Err(ResolutionError::Network(format!(
                    "{} timed out after {:?}",
                    name, self.step_timeout
                ))
                .into())
            }
        }
    }
}
