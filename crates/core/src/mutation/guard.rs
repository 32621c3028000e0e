//! Double-invocation guard for destructive actions
//!
//! A UI double-click can fire the same bulk action twice before the first
//! settles. The guard is an async-aware latch: the second invocation fails
//! fast with `Aborted` whether the first is still in its synchronous
//! prologue or suspended on the backend call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cheapalarms_domain::{CheapAlarmsError, Result};

/// Per-operation invocation latch.
#[derive(Debug, Clone, Default)]
pub struct MutationGuard {
    busy: Arc<AtomicBool>,
}

impl MutationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the latch, or fail with [`CheapAlarmsError::Aborted`] if an
    /// invocation is already pending. The permit releases on drop, including
    /// on panic or early return.
    pub fn try_begin(&self) -> Result<GuardPermit> {
        if self.busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_ok() {
            Ok(GuardPermit { busy: Arc::clone(&self.busy) })
        } else {
            Err(CheapAlarmsError::Aborted)
        }
    }
}

/// Held for the duration of one mutation invocation.
#[derive(Debug)]
pub struct GuardPermit {
    busy: Arc<AtomicBool>,
}

impl Drop for GuardPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
