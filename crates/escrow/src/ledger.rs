use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("unknown asset: {0}")]
    UnknownAsset(String),

    #[error("insufficient balance for {party}: have {have}, need {need}")]
    InsufficientBalance {
        party: String,
        have: u128,
        need: u128,
    },

    #[error("insufficient authorization for {party}: have {have}, need {need}")]
    InsufficientAuthorization {
        party: String,
        have: u128,
        need: u128,
    },

    #[error("insufficient custody: have {have}, need {need}")]
    InsufficientCustody { have: u128, need: u128 },

    #[error("malformed pre-authorization payload: {0}")]
    MalformedPreAuthorization(String),

    #[error("transfer rejected: {0}")]
    TransferRejected(String),
}

/// The custody ledger capability.
///
/// One commingled custody pool per asset; the engine's bookkeeping,
/// not the ledger, attributes pool funds to trades. Implementations
/// may invoke arbitrary party callbacks during transfers, which is
/// exactly what the engine's reentrancy guard defends against.
#[async_trait]
pub trait AssetLedger: Send + Sync {
    /// Move `amount` from a party into the custody pool.
    async fn transfer_in(&self, asset: &str, from: &str, amount: u128) -> Result<(), LedgerError>;

    /// Move `amount` from the custody pool to a party.
    async fn transfer_out(&self, asset: &str, to: &str, amount: u128) -> Result<(), LedgerError>;

    /// Current custody pool balance for an asset.
    async fn balance_of(&self, asset: &str) -> Result<u128, LedgerError>;

    /// Spending capacity the party has pre-authorized for custody
    /// pulls. Backs the composite-create pre-flight check.
    async fn authorized(&self, asset: &str, party: &str) -> Result<u128, LedgerError>;

    /// Apply an out-of-band authorization payload on a party's behalf.
    /// Callers treat failure as advisory; the subsequent `transfer_in`
    /// is what actually enforces authorization.
    async fn apply_pre_authorization(
        &self,
        asset: &str,
        party: &str,
        payload: &[u8],
    ) -> Result<(), LedgerError>;
}

#[derive(Debug, Default)]
struct LedgerState {
    /// (asset, party) -> free balance.
    balances: HashMap<(String, String), u128>,
    /// (asset, party) -> amount pre-authorized for custody pulls.
    authorizations: HashMap<(String, String), u128>,
    /// asset -> custody pool balance.
    custody: HashMap<String, u128>,
}

/// In-memory ledger for tests and demos.
///
/// `transfer_in` consumes authorization: a pull both requires and
/// decrements the pre-authorized amount, the way an allowance works.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit a party's free balance.
    pub fn mint(&self, asset: &str, party: &str, amount: u128) {
        let mut state = self.state.write().unwrap();
        *state
            .balances
            .entry((asset.to_string(), party.to_string()))
            .or_insert(0) += amount;
    }

    /// Set a party's custody-pull authorization.
    pub fn approve(&self, asset: &str, party: &str, amount: u128) {
        let mut state = self.state.write().unwrap();
        state
            .authorizations
            .insert((asset.to_string(), party.to_string()), amount);
    }

    /// A party's free balance (not in custody).
    pub fn balance(&self, asset: &str, party: &str) -> u128 {
        let state = self.state.read().unwrap();
        state
            .balances
            .get(&(asset.to_string(), party.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn custody_balance(&self, asset: &str) -> u128 {
        let state = self.state.read().unwrap();
        state.custody.get(asset).copied().unwrap_or(0)
    }

    /// Drain the custody pool directly, bypassing the engine. Exists
    /// so tests can simulate cross-trade accounting faults.
    pub fn corrupt_custody(&self, asset: &str, amount: u128) {
        let mut state = self.state.write().unwrap();
        let pool = state.custody.entry(asset.to_string()).or_insert(0);
        *pool = pool.saturating_sub(amount);
    }
}

#[async_trait]
impl AssetLedger for InMemoryLedger {
    async fn transfer_in(&self, asset: &str, from: &str, amount: u128) -> Result<(), LedgerError> {
        let mut state = self.state.write().unwrap();
        let key = (asset.to_string(), from.to_string());

        let authorized = state.authorizations.get(&key).copied().unwrap_or(0);
        if authorized < amount {
            return Err(LedgerError::InsufficientAuthorization {
                party: from.to_string(),
                have: authorized,
                need: amount,
            });
        }

        let balance = state.balances.get(&key).copied().unwrap_or(0);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance {
                party: from.to_string(),
                have: balance,
                need: amount,
            });
        }

        state.authorizations.insert(key.clone(), authorized - amount);
        state.balances.insert(key, balance - amount);
        *state.custody.entry(asset.to_string()).or_insert(0) += amount;
        Ok(())
    }

    async fn transfer_out(&self, asset: &str, to: &str, amount: u128) -> Result<(), LedgerError> {
        let mut state = self.state.write().unwrap();

        let pool = state.custody.get(asset).copied().unwrap_or(0);
        if pool < amount {
            return Err(LedgerError::InsufficientCustody {
                have: pool,
                need: amount,
            });
        }

        state.custody.insert(asset.to_string(), pool - amount);
        *state
            .balances
            .entry((asset.to_string(), to.to_string()))
            .or_insert(0) += amount;
        Ok(())
    }

    async fn balance_of(&self, asset: &str) -> Result<u128, LedgerError> {
        Ok(self.custody_balance(asset))
    }

    async fn authorized(&self, asset: &str, party: &str) -> Result<u128, LedgerError> {
        let state = self.state.read().unwrap();
        Ok(state
            .authorizations
            .get(&(asset.to_string(), party.to_string()))
            .copied()
            .unwrap_or(0))
    }

    async fn apply_pre_authorization(
        &self,
        asset: &str,
        party: &str,
        payload: &[u8],
    ) -> Result<(), LedgerError> {
        // Payload format: little-endian u128 authorization amount.
        let bytes: [u8; 16] = payload.try_into().map_err(|_| {
            LedgerError::MalformedPreAuthorization(format!("expected 16 bytes, got {}", payload.len()))
        })?;
        let amount = u128::from_le_bytes(bytes);

        let mut state = self.state.write().unwrap();
        let key = (asset.to_string(), party.to_string());
        let current = state.authorizations.get(&key).copied().unwrap_or(0);
        state.authorizations.insert(key, current.max(amount));
        Ok(())
    }
}

/// Encode an authorization amount as an [`InMemoryLedger`]
/// pre-authorization payload.
pub fn pre_auth_payload(amount: u128) -> Vec<u8> {
    amount.to_le_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_transfer_in_requires_authorization_and_balance() {
        let ledger = InMemoryLedger::new();
        ledger.mint("usd", "alice", 100);

        // No authorization yet.
        assert!(matches!(
            ledger.transfer_in("usd", "alice", 50).await,
            Err(LedgerError::InsufficientAuthorization { .. })
        ));

        ledger.approve("usd", "alice", 50);
        ledger.transfer_in("usd", "alice", 50).await.unwrap();
        assert_eq!(ledger.balance("usd", "alice"), 50);
        assert_eq!(ledger.custody_balance("usd"), 50);

        // Authorization was consumed.
        assert_eq!(ledger.authorized("usd", "alice").await.unwrap(), 0);
        assert!(ledger.transfer_in("usd", "alice", 1).await.is_err());
    }

    #[tokio::test]
    async fn test_transfer_in_insufficient_balance() {
        let ledger = InMemoryLedger::new();
        ledger.mint("usd", "alice", 10);
        ledger.approve("usd", "alice", 100);

        assert!(matches!(
            ledger.transfer_in("usd", "alice", 50).await,
            Err(LedgerError::InsufficientBalance { .. })
        ));
        // Nothing moved.
        assert_eq!(ledger.balance("usd", "alice"), 10);
        assert_eq!(ledger.custody_balance("usd"), 0);
    }

    #[tokio::test]
    async fn test_transfer_out_bounded_by_custody() {
        let ledger = InMemoryLedger::new();
        ledger.mint("usd", "alice", 100);
        ledger.approve("usd", "alice", 100);
        ledger.transfer_in("usd", "alice", 100).await.unwrap();

        assert!(matches!(
            ledger.transfer_out("usd", "bob", 101).await,
            Err(LedgerError::InsufficientCustody { .. })
        ));

        ledger.transfer_out("usd", "bob", 60).await.unwrap();
        assert_eq!(ledger.balance("usd", "bob"), 60);
        assert_eq!(ledger.custody_balance("usd"), 40);
    }

    #[tokio::test]
    async fn test_assets_are_isolated() {
        let ledger = InMemoryLedger::new();
        ledger.mint("usd", "alice", 100);
        ledger.approve("usd", "alice", 100);
        ledger.transfer_in("usd", "alice", 100).await.unwrap();

        assert_eq!(ledger.custody_balance("eur"), 0);
        assert!(ledger.transfer_out("eur", "alice", 1).await.is_err());
    }

    #[tokio::test]
    async fn test_pre_authorization_payload() {
        let ledger = InMemoryLedger::new();
        ledger
            .apply_pre_authorization("usd", "alice", &pre_auth_payload(500))
            .await
            .unwrap();
        assert_eq!(ledger.authorized("usd", "alice").await.unwrap(), 500);

        // Never lowers an existing authorization.
        ledger
            .apply_pre_authorization("usd", "alice", &pre_auth_payload(100))
            .await
            .unwrap();
        assert_eq!(ledger.authorized("usd", "alice").await.unwrap(), 500);

        assert!(matches!(
            ledger.apply_pre_authorization("usd", "alice", &[1, 2, 3]).await,
            Err(LedgerError::MalformedPreAuthorization(_))
        ));
    }
}
