use pact_types::SignatureError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MatcherError {
    #[error("order expired at {expiry}, now {now}")]
    OrderExpired { expiry: u64, now: u64 },

    #[error("buyer {buyer} not on the order allow-list")]
    BuyerNotAllowed { buyer: String },

    #[error("maker cannot fill their own order")]
    SelfFill,

    #[error("nonce {nonce} already consumed for maker {maker}")]
    NonceConsumed { maker: String, nonce: u64 },

    #[error("order fully filled")]
    OrderFullyFilled,

    #[error("signer {signer} does not match order maker {maker}")]
    SignerMismatch { signer: String, maker: String },

    #[error("fill amount must be greater than zero")]
    ZeroFill,

    #[error("fill amount {fill} below order minimum {min}")]
    BelowMinimumFill { fill: u128, min: u128 },

    #[error("fill amount {fill} exceeds remaining quantity {remaining}")]
    ExceedsRemaining { fill: u128, remaining: u128 },

    #[error("fill totals overflow: {0}")]
    AmountOverflow(String),

    #[error("order agreement hash must not be empty")]
    EmptyAgreementHash,

    #[error(transparent)]
    Signature(#[from] SignatureError),
}
