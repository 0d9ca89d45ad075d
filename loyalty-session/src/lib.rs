//! Loyalty Session - scan resolution and order composition engine
//!
//! # Flow
//!
//! ```text
//! scan / typed code
//!     ├─ ScanGuard::submit          (single flight, RAII permit)
//!     ├─ Session::begin_resolve     (Idle|Scanning → Resolving, ticket issued)
//!     ├─ CodeResolver::resolve      (code → restaurant → membership history)
//!     ├─ Session::complete_resolve  (stale tickets discarded)
//!     ├─ Session::toggle / edit_amount   (Ready)
//!     ├─ Session::begin_submit      (Ready → Submitting)
//!     └─ Session::complete_submit   (Idle on success, Ready on failure)
//! ```
//!
//! [`SessionController`] drives these steps over a [`LoyaltyApi`] and
//! broadcasts [`Notice`]s to the UI.
//!
//! [`LoyaltyApi`]: loyalty_client::LoyaltyApi

pub mod composer;
pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod guard;
pub mod ledger;
pub mod machine;
pub mod notice;
pub mod resolver;

#[cfg(test)]
mod testing;

pub use composer::OrderResult;
pub use config::SessionConfig;
pub use context::SessionContext;
pub use controller::SessionController;
pub use error::{ResolutionError, SessionError, ValidationError};
pub use guard::{Admission, ScanGuard, ScanPermit, Trigger};
pub use ledger::{OrderDraft, SelectionChange, SelectionSet, ToggleOutcome};
pub use machine::{Composition, Phase, PhaseKind, Session, SubmitPlan, Ticket, Transition};
pub use notice::Notice;
pub use resolver::CodeResolver;
