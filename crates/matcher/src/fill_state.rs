use std::collections::{HashMap, HashSet};

use pact_types::OrderDigest;

use crate::MatcherError;

/// Replay-protection state for signed orders: cumulative fills per
/// order digest, consumed nonces per maker.
///
/// Entries are created implicitly on first use and never deleted; a
/// consumed nonce stays consumed forever.
#[derive(Debug, Default)]
pub struct OrderFillState {
    filled: HashMap<OrderDigest, u128>,
    consumed_nonces: HashMap<String, HashSet<u64>>,
}

impl OrderFillState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cumulative quantity filled against a digest.
    pub fn filled(&self, digest: &OrderDigest) -> u128 {
        self.filled.get(digest).copied().unwrap_or(0)
    }

    pub fn is_nonce_consumed(&self, maker: &str, nonce: u64) -> bool {
        self.consumed_nonces
            .get(maker)
            .is_some_and(|nonces| nonces.contains(&nonce))
    }

    /// Mark a nonce consumed. Errors if it already was, so preemptive
    /// cancellation of a dead nonce surfaces rather than silently
    /// repeating.
    pub fn consume_nonce(&mut self, maker: &str, nonce: u64) -> Result<(), MatcherError> {
        let nonces = self.consumed_nonces.entry(maker.to_string()).or_default();
        if !nonces.insert(nonce) {
            return Err(MatcherError::NonceConsumed {
                maker: maker.to_string(),
                nonce,
            });
        }
        Ok(())
    }

    /// Accumulate a fill against a digest, returning the new total.
    pub fn record_fill(&mut self, digest: OrderDigest, amount: u128) -> u128 {
        let total = self.filled.entry(digest).or_insert(0);
        *total = total.saturating_add(amount);
        *total
    }
}
