//! Session state machine
//!
//! ```text
//!            start_scan            code captured
//!   Idle ──────────────▶ Scanning ──────────────▶ Resolving
//!    ▲  ◀──── back ────────┘                       │    │
//!    │                                   failure   │    │ success
//!    ├─────────────────────────────────────────────┘    ▼
//!    │   success (full reset)                          Ready ◀─┐
//!    ├──────────────────────────── Submitting ◀─ submit ┘      │
//!    │                                  └──── failure ─────────┘
//!    └── reset / rescan / auth expired (from anywhere)
//! ```
//!
//! Every transition takes the owned [`Session`] and hands it back inside a
//! [`Transition`] together with the outcome. A rejected transition returns
//! the session unchanged.

use std::fmt;

use rust_decimal::Decimal;
use shared::ScanCode;
use shared::client::CreateOrderRequest;
use shared::models::OrderReceipt;

use crate::composer::{self, OrderResult};
use crate::context::SessionContext;
use crate::error::{SessionError, ValidationError};
use crate::ledger::{self, OrderDraft, SelectionSet, ToggleOutcome};

/// Generation stamp of a resolution or submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Data the operator works on once a code is resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub context: SessionContext,
    pub selection: SelectionSet,
    pub amount_text: String,
}

impl Composition {
    fn new(context: SessionContext) -> Self {
        Self {
            context,
            selection: SelectionSet::new(),
            amount_text: String::new(),
        }
    }

    pub fn draft(&self) -> OrderDraft {
        ledger::draft(&self.selection, &self.context.restaurant)
    }

    pub fn available_points(&self) -> i64 {
        ledger::available_points(&self.context, &self.draft())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Scanning,
    Resolving { ticket: Ticket, code: ScanCode },
    Ready(Composition),
    Submitting { ticket: Ticket, composition: Composition },
}

/// Phase without its data, for logs and notices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Idle,
    Scanning,
    Resolving,
    Ready,
    Submitting,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhaseKind::Idle => "idle",
            PhaseKind::Scanning => "scanning",
            PhaseKind::Resolving => "resolving",
            PhaseKind::Ready => "ready",
            PhaseKind::Submitting => "submitting",
        };
        f.write_str(name)
    }
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::Idle => PhaseKind::Idle,
            Phase::Scanning => PhaseKind::Scanning,
            Phase::Resolving { .. } => PhaseKind::Resolving,
            Phase::Ready(_) => PhaseKind::Ready,
            Phase::Submitting { .. } => PhaseKind::Submitting,
        }
    }
}

/// Session plus the result of the operation that produced it
#[derive(Debug)]
#[must_use = "the session is moved into the transition"]
pub struct Transition<T> {
    pub session: Session,
    pub outcome: Result<T, SessionError>,
}

impl<T> Transition<T> {
    fn ok(session: Session, value: T) -> Self {
        Self {
            session,
            outcome: Ok(value),
        }
    }

    fn err(session: Session, error: SessionError) -> Self {
        Self {
            session,
            outcome: Err(error),
        }
    }

    pub fn into_parts(self) -> (Session, Result<T, SessionError>) {
        (self.session, self.outcome)
    }

    /// Map a successful outcome, with read access to the resulting session
    pub fn map<U>(self, f: impl FnOnce(&Session, T) -> U) -> Transition<U> {
        let Transition { session, outcome } = self;
        let outcome = outcome.map(|value| f(&session, value));
        Transition { session, outcome }
    }
}

/// Everything `begin_submit` hands to the caller for the remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitPlan {
    pub ticket: Ticket,
    pub request: CreateOrderRequest,
    pub amount: Decimal,
}

/// The single logical session
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    generation: u64,
    phase: Phase,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Snapshot accessors
    // =========================================================================

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn kind(&self) -> PhaseKind {
        self.phase.kind()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Context of the resolved customer, in `Ready` and `Submitting`
    pub fn context(&self) -> Option<&SessionContext> {
        self.composition().map(|c| &c.context)
    }

    pub fn composition(&self) -> Option<&Composition> {
        match &self.phase {
            Phase::Ready(composition) | Phase::Submitting { composition, .. } => Some(composition),
            _ => None,
        }
    }

    pub fn selection(&self) -> Option<&SelectionSet> {
        self.composition().map(|c| &c.selection)
    }

    pub fn draft(&self) -> Option<OrderDraft> {
        self.composition().map(Composition::draft)
    }

    pub fn amount_text(&self) -> Option<&str> {
        self.composition().map(|c| c.amount_text.as_str())
    }

    fn next_ticket(&mut self) -> Ticket {
        self.generation += 1;
        Ticket(self.generation)
    }

    fn invalid<T>(self, operation: &'static str) -> Transition<T> {
        let phase = self.kind();
        Transition::err(self, SessionError::InvalidState { operation, phase })
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    /// Open the scan surface
    pub fn start_scan(mut self) -> Transition<()> {
        match self.phase {
            Phase::Idle | Phase::Scanning => {
                self.phase = Phase::Scanning;
                Transition::ok(self, ())
            }
            _ => self.invalid("scan"),
        }
    }

    /// Leave the scan surface
    pub fn back(mut self) -> Transition<()> {
        match self.phase {
            Phase::Idle | Phase::Scanning => {
                self.phase = Phase::Idle;
                Transition::ok(self, ())
            }
            _ => self.invalid("back"),
        }
    }

    /// A code was captured or typed; issue a ticket for its resolution
    pub fn begin_resolve(mut self, code: ScanCode) -> Transition<Ticket> {
        match self.phase {
            Phase::Idle | Phase::Scanning => {
                let ticket = self.next_ticket();
                self.phase = Phase::Resolving { ticket, code };
                Transition::ok(self, ticket)
            }
            _ => self.invalid("resolve"),
        }
    }

    /// Commit a resolution result. Any failure returns to `Idle`.
    pub fn complete_resolve(
        mut self,
        ticket: Ticket,
        result: Result<SessionContext, SessionError>,
    ) -> Transition<()> {
        let current = matches!(&self.phase, Phase::Resolving { ticket: t, .. } if *t == ticket);
        if !current {
            return Transition::err(self, SessionError::Superseded);
        }

        match result {
            Ok(context) => {
                self.phase = Phase::Ready(Composition::new(context));
                Transition::ok(self, ())
            }
            Err(error) => {
                self.phase = Phase::Idle;
                Transition::err(self, error)
            }
        }
    }

    // =========================================================================
    // Composition
    // =========================================================================

    /// Flip a meal in the selection; rejected toggles change nothing
    pub fn toggle(mut self, meal_id: &str) -> Transition<ToggleOutcome> {
        let Phase::Ready(composition) = &mut self.phase else {
            return self.invalid("toggle");
        };
        match ledger::toggle(&composition.selection, &composition.context, meal_id) {
            Ok((selection, outcome)) => {
                composition.selection = selection;
                Transition::ok(self, outcome)
            }
            Err(error) => Transition::err(self, error),
        }
    }

    /// Replace the amount text; invalid edits keep the previous text
    pub fn edit_amount(mut self, text: &str) -> Transition<()> {
        let Phase::Ready(composition) = &mut self.phase else {
            return self.invalid("amount");
        };
        match composer::accept_edit(text) {
            Ok(text) => {
                composition.amount_text = text;
                Transition::ok(self, ())
            }
            Err(error) => Transition::err(self, error.into()),
        }
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Validate the amount and move to `Submitting`
    pub fn begin_submit(mut self) -> Transition<SubmitPlan> {
        let composition = match std::mem::take(&mut self.phase) {
            Phase::Ready(composition) => composition,
            other => {
                self.phase = other;
                return self.invalid("submit");
            }
        };
        let amount = composer::parse_amount(&composition.amount_text).and_then(|amount| {
            composer::balance_after(&composition.context, amount)
                .map(|_| amount)
                .ok_or_else(|| ValidationError::InvalidAmount(composition.amount_text.clone()))
        });
        let amount = match amount {
            Ok(amount) => amount,
            Err(error) => {
                self.phase = Phase::Ready(composition);
                return Transition::err(self, error.into());
            }
        };
        let request = composer::build_request(
            &composition.context,
            &composition.draft(),
            &composition.amount_text,
        );

        let ticket = self.next_ticket();
        self.phase = Phase::Submitting {
            ticket,
            composition,
        };
        Transition::ok(
            self,
            SubmitPlan {
                ticket,
                request,
                amount,
            },
        )
    }

    /// Commit a create-order result.
    ///
    /// Success resets everything to `Idle`; an expired credential does too.
    /// Any other failure returns to `Ready` with the composition intact.
    pub fn complete_submit(
        mut self,
        ticket: Ticket,
        amount: Decimal,
        result: Result<OrderReceipt, SessionError>,
    ) -> Transition<OrderResult> {
        let composition = match std::mem::take(&mut self.phase) {
            Phase::Submitting {
                ticket: current,
                composition,
            } if current == ticket => composition,
            other => {
                self.phase = other;
                return Transition::err(self, SessionError::Superseded);
            }
        };

        // phase is Idle from here on unless the failure is recoverable
        match result {
            Ok(receipt) => {
                let order =
                    OrderResult::new(&composition.context, &composition.draft(), amount, receipt);
                Transition::ok(self, order)
            }
            Err(SessionError::AuthExpired) => Transition::err(self, SessionError::AuthExpired),
            Err(error) => {
                self.phase = Phase::Ready(composition);
                Transition::err(self, error)
            }
        }
    }

    /// Settle a resolution or submission whose caller went away before it
    /// completed. `Resolving` falls back to `Idle`, `Submitting` to `Ready`
    /// with the composition intact. Any other ticket is stale.
    pub fn abandon(mut self, ticket: Ticket) -> Transition<()> {
        match std::mem::take(&mut self.phase) {
            Phase::Resolving { ticket: current, .. } if current == ticket => {
                Transition::ok(self, ())
            }
            Phase::Submitting {
                ticket: current,
                composition,
            } if current == ticket => {
                self.phase = Phase::Ready(composition);
                Transition::ok(self, ())
            }
            other => {
                self.phase = other;
                Transition::err(self, SessionError::Superseded)
            }
        }
    }

    // =========================================================================
    // Reset
    // =========================================================================

    /// Drop any context and return to `Idle`. In-flight completions become stale.
    pub fn reset(mut self) -> Transition<()> {
        self.generation += 1;
        self.phase = Phase::Idle;
        Transition::ok(self, ())
    }

    /// "Scan again": reset, then open the scan surface
    pub fn rescan(self) -> Transition<()> {
        self.reset().session.start_scan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ResolutionError, ValidationError};
    use crate::testing::scenario_a_context;

    fn code(raw: &str) -> ScanCode {
        ScanCode::parse(raw).unwrap()
    }

    fn ready() -> Session {
        let (session, ticket) = Session::new().begin_resolve(code("MBR-1")).into_parts();
        let ticket = ticket.unwrap();
        let t = session.complete_resolve(ticket, Ok(scenario_a_context()));
        assert!(t.outcome.is_ok());
        t.session
    }

    #[test]
    fn test_scan_flow() {
        let t = Session::new().start_scan();
        assert_eq!(t.session.kind(), PhaseKind::Scanning);

        let t = t.session.back();
        assert_eq!(t.session.kind(), PhaseKind::Idle);

        let t = t.session.start_scan().session.begin_resolve(code("X"));
        assert_eq!(t.session.kind(), PhaseKind::Resolving);
        assert_eq!(t.outcome.unwrap().generation(), 1);
    }

    #[test]
    fn test_resolve_success_and_failure() {
        let session = ready();
        assert_eq!(session.kind(), PhaseKind::Ready);
        assert_eq!(session.context().unwrap().points(), 100);
        assert_eq!(session.draft(), Some(OrderDraft::default()));
        assert_eq!(session.amount_text(), Some(""));

        let (session, ticket) = Session::new().begin_resolve(code("X")).into_parts();
        let t = session.complete_resolve(
            ticket.unwrap(),
            Err(ResolutionError::Network("down".into()).into()),
        );
        assert_eq!(t.session.kind(), PhaseKind::Idle);
        assert!(t.session.context().is_none());
        assert_eq!(
            t.outcome,
            Err(SessionError::Resolution(ResolutionError::Network("down".into())))
        );
    }

    #[test]
    fn test_stale_resolution_is_discarded() {
        let (session, stale) = Session::new().begin_resolve(code("OLD")).into_parts();
        let stale = stale.unwrap();

        // operator resets and scans another code
        let session = session.reset().session;
        let (session, fresh) = session.begin_resolve(code("NEW")).into_parts();
        let fresh = fresh.unwrap();
        assert_ne!(stale, fresh);

        let t = session.complete_resolve(stale, Ok(scenario_a_context()));
        assert_eq!(t.outcome, Err(SessionError::Superseded));
        assert_eq!(t.session.kind(), PhaseKind::Resolving);

        let t = t.session.complete_resolve(fresh, Ok(scenario_a_context()));
        assert!(t.outcome.is_ok());
        assert_eq!(t.session.kind(), PhaseKind::Ready);
    }

    #[test]
    fn test_operations_rejected_outside_ready() {
        let session = Session::new();
        let t = session.toggle("a");
        assert_eq!(
            t.outcome,
            Err(SessionError::InvalidState {
                operation: "toggle",
                phase: PhaseKind::Idle
            })
        );
        let t = t.session.edit_amount("5");
        assert!(matches!(t.outcome, Err(SessionError::InvalidState { .. })));
        let t = t.session.begin_submit();
        assert!(matches!(t.outcome, Err(SessionError::InvalidState { .. })));
        assert_eq!(t.session, Session::new());

        // Ready requires an explicit rescan before a new code
        let t = ready().begin_resolve(code("AGAIN"));
        assert!(matches!(
            t.outcome,
            Err(SessionError::InvalidState {
                phase: PhaseKind::Ready,
                ..
            })
        ));
        assert_eq!(t.session.kind(), PhaseKind::Ready);
    }

    #[test]
    fn test_rejected_edit_keeps_text() {
        let t = ready().edit_amount("12.5");
        assert!(t.outcome.is_ok());
        let t = t.session.edit_amount("12.5x");
        assert_eq!(
            t.outcome,
            Err(SessionError::Validation(ValidationError::InvalidAmount(
                "12.5x".into()
            )))
        );
        assert_eq!(t.session.amount_text(), Some("12.5"));
    }

    #[test]
    fn test_submit_success_resets() {
        let session = ready().toggle("a").session.edit_amount("15.50").session;
        let (session, plan) = session.begin_submit().into_parts();
        let plan = plan.unwrap();
        assert_eq!(session.kind(), PhaseKind::Submitting);
        assert_eq!(plan.request.used_points, "30");
        assert_eq!(plan.request.price, "15.50");

        let t = session.complete_submit(plan.ticket, plan.amount, Ok(OrderReceipt::default()));
        let order = t.outcome.unwrap();
        assert_eq!(order.new_balance, Decimal::new(11550, 2));
        assert_eq!(t.session.kind(), PhaseKind::Idle);
        assert!(t.session.context().is_none());
        assert!(t.session.selection().is_none());
        assert!(t.session.amount_text().is_none());
    }

    #[test]
    fn test_submit_failure_keeps_composition() {
        let session = ready().toggle("a").session.edit_amount("9").session;
        let before = session.composition().cloned();
        let (session, plan) = session.begin_submit().into_parts();
        let plan = plan.unwrap();

        let t = session.complete_submit(
            plan.ticket,
            plan.amount,
            Err(SessionError::OrderSubmission("502".into())),
        );
        assert!(matches!(t.outcome, Err(SessionError::OrderSubmission(_))));
        assert_eq!(t.session.kind(), PhaseKind::Ready);
        assert_eq!(t.session.composition().cloned(), before);
    }

    #[test]
    fn test_submit_auth_expired_resets() {
        let session = ready().edit_amount("9").session;
        let (session, plan) = session.begin_submit().into_parts();
        let plan = plan.unwrap();
        let t = session.complete_submit(plan.ticket, plan.amount, Err(SessionError::AuthExpired));
        assert_eq!(t.outcome, Err(SessionError::AuthExpired));
        assert_eq!(t.session.kind(), PhaseKind::Idle);
    }

    #[test]
    fn test_submit_requires_amount() {
        let t = ready().begin_submit();
        assert_eq!(
            t.outcome,
            Err(SessionError::Validation(ValidationError::InvalidAmount(
                String::new()
            )))
        );
        assert_eq!(t.session.kind(), PhaseKind::Ready);
    }

    #[test]
    fn test_submit_rejects_unrepresentable_balance() {
        let session = ready().edit_amount("79228162514264337593543950335").session;
        let generation = session.generation();

        let t = session.begin_submit();
        assert_eq!(
            t.outcome,
            Err(SessionError::Validation(ValidationError::InvalidAmount(
                "79228162514264337593543950335".into()
            )))
        );
        assert_eq!(t.session.kind(), PhaseKind::Ready);
        assert_eq!(t.session.generation(), generation);
    }

    #[test]
    fn test_stale_submission_after_reset() {
        let session = ready().edit_amount("9").session;
        let (session, plan) = session.begin_submit().into_parts();
        let plan = plan.unwrap();

        let session = session.reset().session;
        let t = session.complete_submit(plan.ticket, plan.amount, Ok(OrderReceipt::default()));
        assert_eq!(t.outcome, Err(SessionError::Superseded));
        assert_eq!(t.session.kind(), PhaseKind::Idle);
    }

    #[test]
    fn test_abandoned_resolution_returns_to_idle() {
        let (session, ticket) = Session::new().begin_resolve(code("MBR-1")).into_parts();
        let ticket = ticket.unwrap();

        let t = session.abandon(ticket);
        assert!(t.outcome.is_ok());
        assert_eq!(t.session.kind(), PhaseKind::Idle);

        // the next code is accepted again
        let t = t.session.begin_resolve(code("MBR-2"));
        assert!(t.outcome.is_ok());
    }

    #[test]
    fn test_abandoned_submission_keeps_composition() {
        let session = ready().toggle("a").session.edit_amount("9").session;
        let before = session.composition().cloned();
        let (session, plan) = session.begin_submit().into_parts();
        let plan = plan.unwrap();

        let t = session.abandon(plan.ticket);
        assert!(t.outcome.is_ok());
        assert_eq!(t.session.kind(), PhaseKind::Ready);
        assert_eq!(t.session.composition().cloned(), before);
    }

    #[test]
    fn test_abandon_with_stale_ticket_changes_nothing() {
        let (session, ticket) = Session::new().begin_resolve(code("OLD")).into_parts();
        let stale = ticket.unwrap();
        let session = session.reset().session;
        let (session, _) = session.begin_resolve(code("NEW")).into_parts();

        let t = session.abandon(stale);
        assert_eq!(t.outcome, Err(SessionError::Superseded));
        assert_eq!(t.session.kind(), PhaseKind::Resolving);
    }

    #[test]
    fn test_rescan_from_ready() {
        let t = ready().toggle("a").session.rescan();
        assert!(t.outcome.is_ok());
        assert_eq!(t.session.kind(), PhaseKind::Scanning);
        assert!(t.session.context().is_none());
    }
}
