//! Single-flight gate over scan, typed-code and submit triggers

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// What asked for the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Camera decoded a code
    Camera,
    /// Operator typed a code
    Manual,
    /// Operator confirmed the order
    Submit,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Trigger::Camera => "camera",
            Trigger::Manual => "manual",
            Trigger::Submit => "submit",
        };
        f.write_str(name)
    }
}

/// Answer of [`ScanGuard::submit`]
#[derive(Debug)]
#[must_use = "dropping an accepted permit releases the guard immediately"]
pub enum Admission {
    Accepted(ScanPermit),
    Rejected,
}

impl Admission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Admission::Accepted(_))
    }

    pub fn into_permit(self) -> Option<ScanPermit> {
        match self {
            Admission::Accepted(permit) => Some(permit),
            Admission::Rejected => None,
        }
    }
}

/// At most one trigger in flight.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct ScanGuard {
    busy: Arc<AtomicBool>,
}

impl ScanGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to take the gate. A rejected trigger has no other effect.
    pub fn submit(&self, trigger: Trigger) -> Admission {
        match self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                tracing::debug!(%trigger, "Scan guard acquired");
                Admission::Accepted(ScanPermit {
                    busy: Arc::clone(&self.busy),
                    trigger,
                })
            }
            Err(_) => {
                tracing::warn!(%trigger, "Trigger rejected, another one is in flight");
                Admission::Rejected
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Proof of admission; the guard is released when this is dropped,
/// whichever way the holder exits.
#[derive(Debug)]
pub struct ScanPermit {
    busy: Arc<AtomicBool>,
    trigger: Trigger,
}

impl ScanPermit {
    pub fn trigger(&self) -> Trigger {
        self.trigger
    }
}

impl Drop for ScanPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
        tracing::debug!(trigger = %self.trigger, "Scan guard released");
    }
}
