use std::sync::Arc;

use pact_types::{order_digest, OrderDigest, SellOrder, SignDomain, SignatureVerifier};
use tracing::debug;

use crate::{MatcherError, OrderFillState};

/// A fill that has passed every check and is ready to fund.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedFill {
    pub digest: OrderDigest,
    pub fill_amount: u128,
    pub total_price: u128,
    pub total_deposit: u128,
    /// Quantity that will remain after this fill is applied.
    pub remaining_after: u128,
}

/// Result of applying a validated fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillOutcome {
    Partial { remaining: u128 },
    Complete,
}

/// Verification and replay tracking for signed orders.
///
/// Pure bookkeeping: the book never touches the custody ledger, so the
/// whole replay/bounds surface is testable without a backend. The
/// escrow engine validates here, moves funds, then applies the fill.
pub struct SignedOrderBook {
    domain: SignDomain,
    verifier: Arc<dyn SignatureVerifier>,
    state: OrderFillState,
}

impl SignedOrderBook {
    pub fn new(domain: SignDomain, verifier: Arc<dyn SignatureVerifier>) -> Self {
        Self {
            domain,
            verifier,
            state: OrderFillState::new(),
        }
    }

    pub fn domain(&self) -> &SignDomain {
        &self.domain
    }

    /// Canonical digest of an order under this book's domain.
    pub fn digest(&self, order: &SellOrder) -> OrderDigest {
        order_digest(&self.domain, order)
    }

    /// Run every check for a prospective fill without mutating state.
    ///
    /// Check order mirrors the fill sequence: liveness (expiry,
    /// allow-list, nonce), then authenticity (signature recovers the
    /// maker), then quantity bounds, then computed totals.
    pub fn validate_fill(
        &self,
        order: &SellOrder,
        caller: &str,
        fill_amount: u128,
        signature: &[u8],
        now: u64,
    ) -> Result<ValidatedFill, MatcherError> {
        if order.is_expired(now) {
            return Err(MatcherError::OrderExpired {
                expiry: order.expiry,
                now,
            });
        }
        if !order.permits_buyer(caller) {
            return Err(MatcherError::BuyerNotAllowed {
                buyer: caller.to_string(),
            });
        }
        if caller == order.maker {
            return Err(MatcherError::SelfFill);
        }
        if order.agreement_hash.is_empty() {
            return Err(MatcherError::EmptyAgreementHash);
        }
        if self.state.is_nonce_consumed(&order.maker, order.nonce) {
            return Err(MatcherError::NonceConsumed {
                maker: order.maker.clone(),
                nonce: order.nonce,
            });
        }

        let digest = self.digest(order);
        let signer = self.verifier.recover(&digest, signature)?;
        if signer != order.maker {
            return Err(MatcherError::SignerMismatch {
                signer,
                maker: order.maker.clone(),
            });
        }

        let already_filled = self.state.filled(&digest);
        let remaining = order.total_quantity.saturating_sub(already_filled);
        if remaining == 0 {
            return Err(MatcherError::OrderFullyFilled);
        }
        if fill_amount == 0 {
            return Err(MatcherError::ZeroFill);
        }
        if fill_amount < order.min_fill_amount {
            return Err(MatcherError::BelowMinimumFill {
                fill: fill_amount,
                min: order.min_fill_amount,
            });
        }
        if fill_amount > remaining {
            return Err(MatcherError::ExceedsRemaining {
                fill: fill_amount,
                remaining,
            });
        }

        let total_price = order
            .unit_price
            .checked_mul(fill_amount)
            .ok_or_else(|| MatcherError::AmountOverflow("unit_price * fill_amount".to_string()))?;
        let total_deposit = order
            .unit_deposit
            .checked_mul(fill_amount)
            .ok_or_else(|| MatcherError::AmountOverflow("unit_deposit * fill_amount".to_string()))?;

        Ok(ValidatedFill {
            digest,
            fill_amount,
            total_price,
            total_deposit,
            remaining_after: remaining - fill_amount,
        })
    }

    /// Record a validated fill. Consumes the maker's nonce when the
    /// order is exhausted.
    pub fn apply_fill(
        &mut self,
        order: &SellOrder,
        fill: &ValidatedFill,
    ) -> Result<FillOutcome, MatcherError> {
        let total = self.state.record_fill(fill.digest, fill.fill_amount);
        debug!(
            digest = %fill.digest,
            fill_amount = fill.fill_amount,
            total_filled = total,
            "recorded order fill"
        );

        if total >= order.total_quantity {
            self.state.consume_nonce(&order.maker, order.nonce)?;
            Ok(FillOutcome::Complete)
        } else {
            Ok(FillOutcome::Partial {
                remaining: order.total_quantity - total,
            })
        }
    }

    /// Preemptively consume a nonce so no order signed under it can
    /// ever fill.
    pub fn cancel_nonce(&mut self, maker: &str, nonce: u64) -> Result<(), MatcherError> {
        self.state.consume_nonce(maker, nonce)
    }

    pub fn is_nonce_consumed(&self, maker: &str, nonce: u64) -> bool {
        self.state.is_nonce_consumed(maker, nonce)
    }

    /// Remaining fillable quantity for an order. Read-only; still
    /// demands a valid maker signature so third parties cannot probe
    /// arbitrary order shapes.
    pub fn remaining_quantity(
        &self,
        order: &SellOrder,
        signature: &[u8],
    ) -> Result<u128, MatcherError> {
        let digest = self.digest(order);
        let signer = self.verifier.recover(&digest, signature)?;
        if signer != order.maker {
            return Err(MatcherError::SignerMismatch {
                signer,
                maker: order.maker.clone(),
            });
        }
        Ok(order.total_quantity.saturating_sub(self.state.filled(&digest)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pact_types::{party_id_from_private_key, sign_digest, Direction, Secp256k1Verifier};

    const MAKER_KEY: [u8; 32] = [0x42; 32];

    fn maker_id() -> String {
        party_id_from_private_key(&MAKER_KEY).unwrap()
    }

    fn make_order() -> SellOrder {
        SellOrder {
            maker: maker_id(),
            asset: "usd".to_string(),
            unit_price: 100,
            unit_deposit: 50,
            total_quantity: 100,
            min_fill_amount: 10,
            expiry: 0,
            nonce: 1,
            allowed_buyer: None,
            direction: Direction::MakerSells,
            agreement_hash: "terms".to_string(),
        }
    }

    fn make_book() -> SignedOrderBook {
        SignedOrderBook::new(
            SignDomain::new("pact", "test-1"),
            Arc::new(Secp256k1Verifier),
        )
    }

    fn sign(book: &SignedOrderBook, order: &SellOrder) -> Vec<u8> {
        sign_digest(&book.digest(order), &MAKER_KEY).unwrap()
    }

    #[test]
    fn test_validate_fill_computes_totals() {
        let book = make_book();
        let order = make_order();
        let sig = sign(&book, &order);

        let fill = book.validate_fill(&order, "buyer", 60, &sig, 0).unwrap();
        assert_eq!(fill.fill_amount, 60);
        assert_eq!(fill.total_price, 6_000);
        assert_eq!(fill.total_deposit, 3_000);
        assert_eq!(fill.remaining_after, 40);
    }

    #[test]
    fn test_expired_order_rejected() {
        let book = make_book();
        let mut order = make_order();
        order.expiry = 500;
        let sig = sign(&book, &order);

        assert!(matches!(
            book.validate_fill(&order, "buyer", 10, &sig, 500),
            Err(MatcherError::OrderExpired { .. })
        ));
        // Still fillable one tick before expiry.
        assert!(book.validate_fill(&order, "buyer", 10, &sig, 499).is_ok());
    }

    #[test]
    fn test_allow_list_enforced() {
        let book = make_book();
        let mut order = make_order();
        order.allowed_buyer = Some("vip".to_string());
        let sig = sign(&book, &order);

        assert!(matches!(
            book.validate_fill(&order, "walk-in", 10, &sig, 0),
            Err(MatcherError::BuyerNotAllowed { .. })
        ));
        assert!(book.validate_fill(&order, "vip", 10, &sig, 0).is_ok());
    }

    #[test]
    fn test_maker_cannot_self_fill() {
        let book = make_book();
        let order = make_order();
        let sig = sign(&book, &order);

        assert_eq!(
            book.validate_fill(&order, &order.maker, 10, &sig, 0),
            Err(MatcherError::SelfFill)
        );
    }

    #[test]
    fn test_wrong_signer_rejected() {
        let book = make_book();
        let order = make_order();
        let sig = sign_digest(&book.digest(&order), &[0x66; 32]).unwrap();

        assert!(matches!(
            book.validate_fill(&order, "buyer", 10, &sig, 0),
            Err(MatcherError::SignerMismatch { .. })
        ));
    }

    #[test]
    fn test_fill_bounds() {
        let book = make_book();
        let order = make_order();
        let sig = sign(&book, &order);

        assert_eq!(
            book.validate_fill(&order, "buyer", 0, &sig, 0),
            Err(MatcherError::ZeroFill)
        );
        assert_eq!(
            book.validate_fill(&order, "buyer", 5, &sig, 0),
            Err(MatcherError::BelowMinimumFill { fill: 5, min: 10 })
        );
        assert_eq!(
            book.validate_fill(&order, "buyer", 101, &sig, 0),
            Err(MatcherError::ExceedsRemaining {
                fill: 101,
                remaining: 100
            })
        );
    }

    #[test]
    fn test_overflow_rejected() {
        let book = make_book();
        let mut order = make_order();
        order.unit_price = u128::MAX;
        order.total_quantity = 100;
        let sig = sign(&book, &order);

        assert!(matches!(
            book.validate_fill(&order, "buyer", 10, &sig, 0),
            Err(MatcherError::AmountOverflow(_))
        ));
    }

    #[test]
    fn test_partial_then_complete_fill_consumes_nonce() {
        let mut book = make_book();
        let order = make_order();
        let sig = sign(&book, &order);

        // Fill 60 of 100.
        let fill = book.validate_fill(&order, "buyer", 60, &sig, 0).unwrap();
        let outcome = book.apply_fill(&order, &fill).unwrap();
        assert_eq!(outcome, FillOutcome::Partial { remaining: 40 });
        assert!(!book.is_nonce_consumed(&order.maker, order.nonce));

        // Fill the remaining 40.
        let fill = book.validate_fill(&order, "buyer2", 40, &sig, 0).unwrap();
        let outcome = book.apply_fill(&order, &fill).unwrap();
        assert_eq!(outcome, FillOutcome::Complete);
        assert!(book.is_nonce_consumed(&order.maker, order.nonce));

        // Any further fill fails: the nonce check fires first.
        assert!(matches!(
            book.validate_fill(&order, "buyer3", 10, &sig, 0),
            Err(MatcherError::NonceConsumed { .. })
        ));
    }

    #[test]
    fn test_fills_never_exceed_total_quantity() {
        let mut book = make_book();
        let order = make_order();
        let sig = sign(&book, &order);

        let fill = book.validate_fill(&order, "buyer", 90, &sig, 0).unwrap();
        book.apply_fill(&order, &fill).unwrap();

        // 20 > the 10 remaining.
        assert_eq!(
            book.validate_fill(&order, "buyer", 20, &sig, 0),
            Err(MatcherError::ExceedsRemaining {
                fill: 20,
                remaining: 10
            })
        );
    }

    #[test]
    fn test_cancel_nonce_blocks_unfilled_order() {
        let mut book = make_book();
        let order = make_order();
        let sig = sign(&book, &order);

        book.cancel_nonce(&order.maker, order.nonce).unwrap();
        assert!(matches!(
            book.validate_fill(&order, "buyer", 10, &sig, 0),
            Err(MatcherError::NonceConsumed { .. })
        ));

        // Cancelling again is an error.
        assert!(book.cancel_nonce(&order.maker, order.nonce).is_err());
    }

    #[test]
    fn test_remaining_quantity_tracks_fills() {
        let mut book = make_book();
        let order = make_order();
        let sig = sign(&book, &order);

        assert_eq!(book.remaining_quantity(&order, &sig).unwrap(), 100);

        let fill = book.validate_fill(&order, "buyer", 25, &sig, 0).unwrap();
        book.apply_fill(&order, &fill).unwrap();
        assert_eq!(book.remaining_quantity(&order, &sig).unwrap(), 75);
    }

    #[test]
    fn test_remaining_quantity_requires_valid_signature() {
        let book = make_book();
        let order = make_order();
        let sig = sign_digest(&book.digest(&order), &[0x66; 32]).unwrap();

        assert!(matches!(
            book.remaining_quantity(&order, &sig),
            Err(MatcherError::SignerMismatch { .. })
        ));
        assert!(book.remaining_quantity(&order, &[]).is_err());
    }
}
