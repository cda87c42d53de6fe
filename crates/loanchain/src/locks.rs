//! Per-loan append serialization.
//!
//! One async mutex per loan id, created on first use. Appends on different
//! loans never wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError, Weak};

use tokio::sync::{Mutex, OwnedMutexGuard};

use loanchain_core::LoanId;

/// Held for the duration of one read-latest-then-append cycle.
pub type LoanGuard = OwnedMutexGuard<()>;

/// Dead entries are swept once the table reaches this size.
const SWEEP_THRESHOLD: usize = 1024;

/// Registry of per-loan locks.
///
/// Entries are weak: a lock lives only while some task holds or awaits it.
#[derive(Default)]
pub struct LoanLocks {
    slots: StdMutex<HashMap<LoanId, Weak<Mutex<()>>>>,
}

impl LoanLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `loan_id`.
    pub async fn acquire(&self, loan_id: &LoanId) -> LoanGuard {
        self.slot(loan_id).lock_owned().await
    }

    /// Number of loans with a live lock.
    pub fn active(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.values().filter(|slot| slot.strong_count() > 0).count()
    }

    fn slot(&self, loan_id: &LoanId) -> Arc<Mutex<()>> {
        // The table is only ever left in a consistent state, so a poisoned
        // guard is still usable.
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = slots.get(loan_id).and_then(Weak::upgrade) {
            return existing;
        }
        if slots.len() >= SWEEP_THRESHOLD {
            slots.retain(|_, slot| slot.strong_count() > 0);
        }

        let slot = Arc::new(Mutex::new(()));
        slots.insert(loan_id.clone(), Arc::downgrade(&slot));
        slot
    }
}
