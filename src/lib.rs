//! Pact: a peer-to-peer trade escrow.
//!
//! Two counterparties commit to an off-system agreement, both post
//! collateral (one side also posts the price) into a shared custody
//! pool, and funds release when both confirm or a dispute is
//! arbitrated. A signed-order matcher lets a maker pre-authorize many
//! trades off-system for takers to fill on demand.
//!
//! This crate is a facade over the workspace members:
//! - [`pact_types`] — trade/order data model, digests, signatures
//! - [`pact_config`] — platform configuration
//! - [`pact_matcher`] — signed-order validation and replay tracking
//! - [`pact_escrow`] — the escrow engine

pub use pact_config as config;
pub use pact_escrow as escrow;
pub use pact_matcher as matcher;
pub use pact_types as types;

pub use pact_config::{ConfigLoader, PlatformConfig};
pub use pact_escrow::{
    AssetLedger, Clock, EscrowEngine, EscrowError, EscrowEvent, InMemoryLedger, ManualClock,
    SystemClock, TradeRequest,
};
pub use pact_types::{
    Direction, Secp256k1Verifier, SellOrder, SignDomain, Trade, TradeStatus,
};
