use pact_types::OrderDigest;
use serde::{Deserialize, Serialize};

/// Observable facts emitted by the engine, one per completed state
/// change. Consumers (indexers, notification layers) read these; the
/// engine never acts on its own events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EscrowEvent {
    TradeCreated {
        id: u64,
        maker: String,
        taker: String,
        agreement_hash: String,
        price: u128,
    },
    TradeFunded {
        id: u64,
        funder: String,
        amount: u128,
    },
    TradeConfirmed {
        id: u64,
        confirmer: String,
    },
    TradeSettled {
        id: u64,
        fee: u128,
    },
    TradeCancelled {
        id: u64,
    },
    TradeDisputed {
        id: u64,
        disputer: String,
    },
    DisputeCancelled {
        id: u64,
        resolver: String,
    },
    RefundClaimed {
        id: u64,
        claimer: String,
        amount: u128,
    },
    AdminWithdrawal {
        id: u64,
        admin: String,
        amount: u128,
    },
    DisputeResolved {
        id: u64,
        winner: String,
        loser: String,
        fee: u128,
        reason: String,
    },
    DisputeCleared {
        id: u64,
        admin: String,
        reason: String,
    },
    FeeUpdated {
        new_bps: u32,
    },
    VaultUpdated {
        new_vault: String,
    },
    AdminUpdated {
        new_admin: String,
    },
    OrderPartiallyFilled {
        digest: OrderDigest,
        taker: String,
        fill_amount: u128,
        remaining: u128,
    },
    OrderFullyFilled {
        digest: OrderDigest,
        last_taker: String,
    },
}
