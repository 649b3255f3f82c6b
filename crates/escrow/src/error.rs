use pact_matcher::MatcherError;
use thiserror::Error;

use crate::LedgerError;

/// Engine error taxonomy. Every failure aborts the whole operation
/// with no partial effect; there is no recovery inside the engine.
#[derive(Debug, Error, PartialEq)]
pub enum EscrowError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Authorization(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("already performed: {0}")]
    DoubleAction(String),

    /// The custody pool holds less than this trade's recorded escrow.
    /// A consistency fault in the ledger or cross-trade bookkeeping,
    /// not a caller error.
    #[error("custody balance {have} below required escrow {need} for asset {asset}")]
    InsufficientCustody {
        asset: String,
        have: u128,
        need: u128,
    },

    #[error("signature rejected: {0}")]
    Signature(String),

    #[error("replay rejected: {0}")]
    Replay(String),

    #[error("reentrant call rejected")]
    Reentrancy,

    #[error("trade not found: {0}")]
    TradeNotFound(u64),

    #[error("amount overflow computing {0}")]
    Overflow(String),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl From<MatcherError> for EscrowError {
    fn from(err: MatcherError) -> Self {
        match err {
            MatcherError::OrderExpired { .. } => EscrowError::InvalidState(err.to_string()),
            MatcherError::BuyerNotAllowed { .. } => EscrowError::Authorization(err.to_string()),
            MatcherError::NonceConsumed { .. } | MatcherError::OrderFullyFilled => {
                EscrowError::Replay(err.to_string())
            }
            MatcherError::SignerMismatch { .. } => EscrowError::Signature(err.to_string()),
            MatcherError::Signature(inner) => EscrowError::Signature(inner.to_string()),
            MatcherError::SelfFill
            | MatcherError::ZeroFill
            | MatcherError::BelowMinimumFill { .. }
            | MatcherError::ExceedsRemaining { .. }
            | MatcherError::AmountOverflow(_)
            | MatcherError::EmptyAgreementHash => EscrowError::Validation(err.to_string()),
        }
    }
}
