use pact_types::{Role, Trade};

use crate::EscrowError;

/// Amount a party owes at funding time: price + deposit for the price
/// payer of this direction, deposit alone for the other side. The same
/// amounts come back out through `claim_refund` after cancellation.
pub fn required_funding(trade: &Trade, role: Role) -> Result<u128, EscrowError> {
    let is_price_payer =
        trade.party(role) == trade.direction.price_payer(&trade.maker, &trade.taker);
    required_amount(is_price_payer, trade.price, trade.deposit)
}

/// Role-mapped amount for a prospective trade that does not exist yet
/// (composite create, signed-order fills).
pub fn required_amount(
    is_price_payer: bool,
    price: u128,
    deposit: u128,
) -> Result<u128, EscrowError> {
    if is_price_payer {
        price
            .checked_add(deposit)
            .ok_or_else(|| EscrowError::Overflow("price + deposit".to_string()))
    } else {
        Ok(deposit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pact_types::{Direction, TradeStatus};

    fn make_trade(direction: Direction) -> Trade {
        Trade {
            id: 1,
            maker: "maker".to_string(),
            taker: "taker".to_string(),
            asset: "usd".to_string(),
            price: 10_000,
            deposit: 5_000,
            funding_deadline: 1_000,
            direction,
            agreement_hash: "terms".to_string(),
            status: TradeStatus::Open,
            disputer: None,
            maker_funded: false,
            taker_funded: false,
            maker_confirmed: false,
            taker_confirmed: false,
        }
    }

    #[test]
    fn test_maker_sells_taker_pays_price() {
        let trade = make_trade(Direction::MakerSells);
        assert_eq!(required_funding(&trade, Role::Taker).unwrap(), 15_000);
        assert_eq!(required_funding(&trade, Role::Maker).unwrap(), 5_000);
    }

    #[test]
    fn test_maker_buys_maker_pays_price() {
        let trade = make_trade(Direction::MakerBuys);
        assert_eq!(required_funding(&trade, Role::Maker).unwrap(), 15_000);
        assert_eq!(required_funding(&trade, Role::Taker).unwrap(), 5_000);
    }

    #[test]
    fn test_overflow_surfaces() {
        let mut trade = make_trade(Direction::MakerSells);
        trade.price = u128::MAX;
        assert!(matches!(
            required_funding(&trade, Role::Taker),
            Err(EscrowError::Overflow(_))
        ));
        // Deposit-only side is unaffected.
        assert!(required_funding(&trade, Role::Maker).is_ok());
    }
}
