use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::EscrowError;

/// Single-call mutual exclusion around fund-moving operations.
///
/// The execution model is serialized, but an outbound ledger transfer
/// can run arbitrary callback code; if that code re-enters the engine,
/// the second acquisition fails immediately instead of observing
/// half-updated state. The flag is held for exactly one top-level call
/// and released on every exit path via the RAII scope.
#[derive(Debug, Clone, Default)]
pub struct CallGuard {
    held: Arc<AtomicBool>,
}

impl CallGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the guard for one call. Fails with ReentrancyError when
    /// already held.
    pub fn enter(&self) -> Result<GuardScope, EscrowError> {
        if self.held.swap(true, Ordering::AcqRel) {
            return Err(EscrowError::Reentrancy);
        }
        Ok(GuardScope {
            held: Arc::clone(&self.held),
        })
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

/// Releases the guard when dropped, including on error paths.
#[derive(Debug)]
pub struct GuardScope {
    held: Arc<AtomicBool>,
}

impl Drop for GuardScope {
    fn drop(&mut self) {
        self.held.store(false, Ordering::Release);
    }
}
