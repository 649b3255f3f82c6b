use pact_config::BPS_DENOMINATOR;

use crate::EscrowError;

/// The payout split for a fully confirmed trade.
///
/// Conservation invariant, for every valid price/deposit/fee_bps:
/// `fee + price_recipient_payout + deposit_recipient_payout ==
/// price + 2 * deposit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementSplit {
    /// Platform fee on the price component, floor division.
    pub fee: u128,

    /// price + deposit − fee, to the party that delivered the priced
    /// asset.
    pub price_recipient_payout: u128,

    /// The other side's deposit, returned whole.
    pub deposit_recipient_payout: u128,

    /// Everything custody should hold for this trade.
    pub total_escrow: u128,
}

impl SettlementSplit {
    pub fn compute(price: u128, deposit: u128, fee_bps: u32) -> Result<Self, EscrowError> {
        if fee_bps > BPS_DENOMINATOR {
            return Err(EscrowError::Validation(format!(
                "fee_bps {} exceeds {}",
                fee_bps, BPS_DENOMINATOR
            )));
        }

        let fee = price
            .checked_mul(fee_bps as u128)
            .ok_or_else(|| EscrowError::Overflow("price * fee_bps".to_string()))?
            / BPS_DENOMINATOR as u128;

        let total_escrow = deposit
            .checked_mul(2)
            .and_then(|d| d.checked_add(price))
            .ok_or_else(|| EscrowError::Overflow("price + 2 * deposit".to_string()))?;

        // fee <= price because fee_bps <= 10_000, so this cannot
        // underflow once total_escrow fits.
        let price_recipient_payout = price + deposit - fee;

        Ok(Self {
            fee,
            price_recipient_payout,
            deposit_recipient_payout: deposit,
            total_escrow,
        })
    }
}
