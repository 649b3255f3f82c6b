use serde::{Deserialize, Serialize};

use crate::Direction;

/// An off-system authorization to trade, signed by the maker and
/// presented by a taker at fill time.
///
/// Orders are ephemeral: nothing here is stored. The canonical digest
/// (see [`crate::digest`]) is recomputed on every fill or query and
/// doubles as the fill-tracking key, so a tampered order simply tracks
/// as a different (unsigned) order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellOrder {
    /// The signer. Recovered signer identity must match this field.
    pub maker: String,

    /// Custody ledger asset the resulting trades escrow.
    pub asset: String,

    /// Price and collateral owed per unit of quantity.
    pub unit_price: u128,
    pub unit_deposit: u128,

    /// Total quantity the maker is willing to have filled, across all
    /// takers and fills.
    pub total_quantity: u128,

    /// Smallest fill a taker may take. Dust protection.
    pub min_fill_amount: u128,

    /// Absolute expiry timestamp; 0 means the order never expires.
    pub expiry: u64,

    /// Maker-scoped replay-prevention counter.
    pub nonce: u64,

    /// When set, only this party may fill the order.
    pub allowed_buyer: Option<String>,

    pub direction: Direction,

    /// Commitment to the off-system terms; never empty.
    pub agreement_hash: String,
}

impl SellOrder {
    pub fn is_expired(&self, now: u64) -> bool {
        self.expiry != 0 && now >= self.expiry
    }

    pub fn permits_buyer(&self, buyer: &str) -> bool {
        match &self.allowed_buyer {
            Some(allowed) => allowed == buyer,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_order() -> SellOrder {
        SellOrder {
            maker: "maker".to_string(),
            asset: "usd".to_string(),
            unit_price: 100,
            unit_deposit: 50,
            total_quantity: 1_000,
            min_fill_amount: 10,
            expiry: 0,
            nonce: 7,
            allowed_buyer: None,
            direction: Direction::MakerSells,
            agreement_hash: "terms".to_string(),
        }
    }

    #[test]
    fn test_expiry_zero_never_expires() {
        let order = make_order();
        assert!(!order.is_expired(0));
        assert!(!order.is_expired(u64::MAX));
    }

    #[test]
    fn test_expiry_boundary() {
        let mut order = make_order();
        order.expiry = 100;
        assert!(!order.is_expired(99));
        assert!(order.is_expired(100));
        assert!(order.is_expired(101));
    }

    #[test]
    fn test_allowed_buyer() {
        let mut order = make_order();
        assert!(order.permits_buyer("anyone"));

        order.allowed_buyer = Some("vip".to_string());
        assert!(order.permits_buyer("vip"));
        assert!(!order.permits_buyer("anyone"));
    }
}
