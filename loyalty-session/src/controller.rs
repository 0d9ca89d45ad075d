//! SessionController - drives the session over a [`LoyaltyApi`]
//!
//! # Resolution flow
//!
//! ```text
//! submit_code(trigger, raw)
//!     ├─ 1. ScanGuard::submit        (Rejected → Failed(ScanRejected))
//!     ├─ 2. ScanCode::parse
//!     ├─ 3. Session::begin_resolve   (lock held only for the transition)
//!     ├─ 4. CodeResolver::resolve    (no lock held)
//!     ├─ 5. Session::complete_resolve
//!     ├─ 6. Broadcast notice(s)
//!     └─ 7. Release the permit
//! ```
//!
//! Every error returned to the caller is also broadcast exactly once as
//! [`Notice::Failed`], except [`SessionError::Superseded`], which is only logged.
//!
//! If the caller drops a `submit_code` or `submit_order` future mid-flight,
//! the session is settled through [`Session::abandon`] before the permit is
//! released.

use std::sync::Arc;

use loyalty_client::LoyaltyApi;
use parking_lot::Mutex;
use shared::ScanCode;
use tokio::sync::broadcast;

use crate::composer::OrderResult;
use crate::config::SessionConfig;
use crate::error::{SessionError, ValidationError};
use crate::guard::{Admission, ScanGuard, Trigger};
use crate::ledger::ToggleOutcome;
use crate::machine::{Session, Ticket, Transition};
use crate::notice::Notice;
use crate::resolver::CodeResolver;

pub struct SessionController<A: LoyaltyApi + ?Sized> {
    api: Arc<A>,
    resolver: CodeResolver<A>,
    guard: ScanGuard,
    session: Mutex<Session>,
    notices: broadcast::Sender<Notice>,
}

impl<A: LoyaltyApi + ?Sized> SessionController<A> {
    pub fn new(api: Arc<A>, config: SessionConfig) -> Self {
        let (notices, _) = broadcast::channel(config.notice_capacity.max(1));
        Self {
            resolver: CodeResolver::new(Arc::clone(&api), config.lookup_timeout),
            api,
            guard: ScanGuard::new(),
            session: Mutex::new(Session::new()),
            notices,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Copy of the current session, for rendering
    pub fn snapshot(&self) -> Session {
        self.session.lock().clone()
    }

    /// Whether a resolution or submission is in flight
    pub fn is_busy(&self) -> bool {
        self.guard.is_busy()
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    fn emit(&self, notice: Notice) {
        // no subscribers is fine
        let _ = self.notices.send(notice);
    }

    /// Run one transition under the lock, then announce any phase change
    fn apply<T>(&self, f: impl FnOnce(Session) -> Transition<T>) -> Result<T, SessionError> {
        let (from, to, outcome) = {
            let mut slot = self.session.lock();
            let from = slot.kind();
            // 在副本上执行转换，panic 时锁内仍是原会话
            let Transition { session, outcome } = f(slot.clone());
            let to = session.kind();
            *slot = session;
            (from, to, outcome)
        };

        if from != to {
            tracing::info!(%from, %to, "Session phase changed");
            self.emit(Notice::PhaseChanged { from, to });
        }
        outcome
    }

    /// Broadcast a failure once
    fn surface<T>(&self, result: Result<T, SessionError>) -> Result<T, SessionError> {
        if let Err(error) = &result {
            match error {
                SessionError::Superseded => {
                    tracing::warn!("Discarded stale completion");
                }
                error => {
                    if error.is_advisory() {
                        tracing::debug!(error = %error, "Advisory");
                    } else {
                        tracing::warn!(
                            code = %error.code(),
                            error = %error,
                            "Session operation failed"
                        );
                    }
                    self.emit(Notice::Failed(error.clone()));
                }
            }
        }
        result
    }

    fn admit(&self, trigger: Trigger) -> Result<crate::guard::ScanPermit, SessionError> {
        match self.guard.submit(trigger) {
            Admission::Accepted(permit) => Ok(permit),
            Admission::Rejected => Err(SessionError::ScanRejected),
        }
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    pub fn start_scan(&self) -> Result<(), SessionError> {
        let result = self.apply(Session::start_scan);
        self.surface(result)
    }

    pub fn back(&self) -> Result<(), SessionError> {
        let result = self.apply(Session::back);
        self.surface(result)
    }

    /// Resolve a camera-decoded or typed code into a session context
    pub async fn submit_code(&self, trigger: Trigger, raw: &str) -> Result<(), SessionError> {
        let permit = match self.admit(trigger) {
            Ok(permit) => permit,
            Err(error) => return self.surface(Err(error)),
        };

        let code = match ScanCode::parse(raw) {
            Ok(code) => code,
            Err(_) => return self.surface(Err(ValidationError::EmptyCode.into())),
        };

        let ticket = match self.apply(|s| s.begin_resolve(code.clone())) {
            Ok(ticket) => ticket,
            Err(error) => return self.surface(Err(error)),
        };

        let in_flight = InFlight::new(self, ticket);
        let result = self.resolver.resolve(&code).await;
        let auth_expired = result.as_ref().is_err_and(SessionError::requires_sign_in);

        let committed = self.apply(|s| {
            s.complete_resolve(ticket, result).map(|session, ()| {
                session.context().map(|c| Notice::Resolved {
                    restaurant_id: c.restaurant.id.clone(),
                    membership_code: c.membership.code.clone(),
                    points: c.points(),
                })
            })
        });
        in_flight.settled();

        let outcome = match committed {
            Ok(resolved) => {
                tracing::info!(
                    code = %code,
                    generation = ticket.generation(),
                    "Membership code resolved"
                );
                if let Some(notice) = resolved {
                    self.emit(notice);
                }
                Ok(())
            }
            Err(error) => self.surface(Err(error)),
        };
        if auth_expired {
            self.emit(Notice::SignedOut);
        }

        drop(permit);
        outcome
    }

    // =========================================================================
    // Composition
    // =========================================================================

    pub fn toggle(&self, meal_id: &str) -> Result<ToggleOutcome, SessionError> {
        let result = self.apply(|s| s.toggle(meal_id));
        if let Ok(outcome) = &result {
            tracing::info!(
                meal_id = %outcome.meal_id,
                change = ?outcome.change,
                points_delta = outcome.draft.points_delta,
                "Selection changed"
            );
            self.emit(Notice::SelectionChanged(outcome.clone()));
        }
        self.surface(result)
    }

    pub fn edit_amount(&self, text: &str) -> Result<(), SessionError> {
        let result = self.apply(|s| s.edit_amount(text));
        self.surface(result)
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Create the order. `amount` replaces the typed amount first when given.
    pub async fn submit_order(&self, amount: Option<&str>) -> Result<OrderResult, SessionError> {
        let permit = match self.admit(Trigger::Submit) {
            Ok(permit) => permit,
            Err(error) => return self.surface(Err(error)),
        };

        if let Some(text) = amount {
            if let Err(error) = self.apply(|s| s.edit_amount(text)) {
                return self.surface(Err(error));
            }
        }

        let plan = match self.apply(Session::begin_submit) {
            Ok(plan) => plan,
            Err(error) => return self.surface(Err(error)),
        };

        tracing::info!(
            restaurant_id = %plan.request.restaurant_id,
            user_id = %plan.request.user_id,
            price = %plan.request.price,
            used_points = %plan.request.used_points,
            generation = plan.ticket.generation(),
            "Submitting order"
        );
        let in_flight = InFlight::new(self, plan.ticket);
        let result = self
            .api
            .create_order(&plan.request)
            .await
            .map_err(SessionError::from_submission);

        if let Err(error) = &result {
            tracing::error!(error = %error, "Order submission failed");
        }
        let auth_expired = result.as_ref().is_err_and(SessionError::requires_sign_in);

        let committed = self.apply(|s| s.complete_submit(plan.ticket, plan.amount, result));
        in_flight.settled();
        let outcome = match committed {
            Ok(order) => {
                tracing::info!(
                    order_id = ?order.order_id,
                    new_balance = %order.new_balance,
                    "Order created"
                );
                self.emit(Notice::OrderCreated(order.clone()));
                Ok(order)
            }
            Err(error) => self.surface(Err(error)),
        };
        if auth_expired {
            self.emit(Notice::SignedOut);
        }

        drop(permit);
        outcome
    }

    // =========================================================================
    // Reset
    // =========================================================================

    /// "Scan again"
    pub fn rescan(&self) -> Result<(), SessionError> {
        let result = self.apply(Session::rescan);
        self.surface(result)
    }

    /// Drop the context and return to idle
    pub fn reset(&self) {
        // reset never fails
        let _ = self.apply(Session::reset);
    }

    /// Forget the cashier credential and reset the session
    pub async fn sign_out(&self) {
        if let Err(e) = self.api.sign_out().await {
            tracing::warn!(error = %e, "Failed to clear credential");
        }
        self.reset();
        tracing::info!("Signed out");
        self.emit(Notice::SignedOut);
    }
}

/// Settles the session if the future owning a ticket is dropped before the
/// completion is committed
struct InFlight<'a, A: LoyaltyApi + ?Sized> {
    controller: &'a SessionController<A>,
    ticket: Option<Ticket>,
}

impl<'a, A: LoyaltyApi + ?Sized> InFlight<'a, A> {
    fn new(controller: &'a SessionController<A>, ticket: Ticket) -> Self {
        Self {
            controller,
            ticket: Some(ticket),
        }
    }

    /// The completion was committed; nothing to do on drop
    fn settled(mut self) {
        self.ticket = None;
    }
}

impl<A: LoyaltyApi + ?Sized> Drop for InFlight<'_, A> {
    fn drop(&mut self) {
        let Some(ticket) = self.ticket.take() else {
            return;
        };
        if self.controller.apply(|s| s.abandon(ticket)).is_ok() {
            tracing::warn!(
                generation = ticket.generation(),
                "Caller went away mid-flight, session settled"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::PhaseKind;
    use async_trait::async_trait;
    use loyalty_client::{ClientError, ClientResult, CodeLookup, RestaurantLookup};
    use shared::client::CreateOrderRequest;
    use shared::models::{MembershipRecord, OrderReceipt};
    use std::panic::AssertUnwindSafe;

    /// Backend that is never reached
    struct Offline;

    #[async_trait]
    impl LoyaltyApi for Offline {
        async fn lookup_code(&self, _code: &ScanCode) -> ClientResult<CodeLookup> {
            Err(ClientError::Internal("offline".into()))
        }

        async fn lookup_restaurant(&self, _: &str, _: &str) -> ClientResult<RestaurantLookup> {
            Err(ClientError::Internal("offline".into()))
        }

        async fn lookup_membership_history(&self, _: &str) -> ClientResult<Vec<MembershipRecord>> {
            Err(ClientError::Internal("offline".into()))
        }

        async fn create_order(&self, _: &CreateOrderRequest) -> ClientResult<OrderReceipt> {
            Err(ClientError::Internal("offline".into()))
        }

        async fn sign_out(&self) -> ClientResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_panicking_transition_keeps_session() {
        let ctl = SessionController::new(Arc::new(Offline), SessionConfig::default());
        ctl.reset();
        ctl.start_scan().unwrap();
        assert_eq!(ctl.snapshot().generation(), 1);

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
            ctl.apply(|_| -> Transition<()> { panic!("transition bug") })
        }));
        assert!(result.is_err());

        // generation never goes backwards
        let session = ctl.snapshot();
        assert_eq!(session.kind(), PhaseKind::Scanning);
        assert_eq!(session.generation(), 1);
        assert!(ctl.start_scan().is_ok());
    }
}
