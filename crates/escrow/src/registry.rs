use std::collections::HashMap;

use pact_types::{Direction, Trade, TradeStatus};

use crate::EscrowError;

/// Parameters for a direct trade creation. The taker is the caller and
/// is supplied separately.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRequest {
    pub maker: String,
    pub asset: String,
    pub price: u128,
    pub deposit: u128,
    /// Seconds from creation until the funding deadline.
    pub funding_window: u64,
    pub direction: Direction,
    pub agreement_hash: String,
}

/// Parameters for a matcher-created trade that is born Funded. Price
/// and deposit are computed totals and may be zero.
#[derive(Debug, Clone, PartialEq)]
pub struct FundedTradeSpec {
    pub maker: String,
    pub taker: String,
    pub asset: String,
    pub price: u128,
    pub deposit: u128,
    pub direction: Direction,
    pub agreement_hash: String,
}

/// Owns the trade table. Identifiers are assigned monotonically from 1
/// and every status change passes the transition table.
#[derive(Debug, Default)]
pub struct TradeRegistry {
    trades: HashMap<u64, Trade>,
    next_id: u64,
}

impl TradeRegistry {
    pub fn new() -> Self {
        Self {
            trades: HashMap::new(),
            next_id: 1,
        }
    }

    /// Create an Open trade. Direct creations demand positive price
    /// and deposit.
    pub fn create(
        &mut self,
        taker: &str,
        request: TradeRequest,
        now: u64,
    ) -> Result<u64, EscrowError> {
        if request.maker.is_empty() {
            return Err(EscrowError::Validation("maker must not be empty".to_string()));
        }
        if taker.is_empty() {
            return Err(EscrowError::Validation("taker must not be empty".to_string()));
        }
        if request.maker == taker {
            return Err(EscrowError::Validation(
                "maker and taker must differ".to_string(),
            ));
        }
        if request.asset.is_empty() {
            return Err(EscrowError::Validation("asset must not be empty".to_string()));
        }
        if request.price == 0 || request.deposit == 0 {
            return Err(EscrowError::Validation(
                "price and deposit must both be positive".to_string(),
            ));
        }
        if request.agreement_hash.is_empty() {
            return Err(EscrowError::Validation(
                "agreement hash must not be empty".to_string(),
            ));
        }
        let funding_deadline = now
            .checked_add(request.funding_window)
            .ok_or_else(|| EscrowError::Overflow("now + funding_window".to_string()))?;

        let id = self.allocate_id();
        self.trades.insert(
            id,
            Trade {
                id,
                maker: request.maker,
                taker: taker.to_string(),
                asset: request.asset,
                price: request.price,
                deposit: request.deposit,
                funding_deadline,
                direction: request.direction,
                agreement_hash: request.agreement_hash,
                status: TradeStatus::Open,
                disputer: None,
                maker_funded: false,
                taker_funded: false,
                maker_confirmed: false,
                taker_confirmed: false,
            },
        );
        Ok(id)
    }

    /// Checks a funded-trade spec without touching the table, so the
    /// matcher can fail before any funds move.
    pub fn validate_funded_spec(spec: &FundedTradeSpec) -> Result<(), EscrowError> {
        if spec.maker.is_empty() {
            return Err(EscrowError::Validation("maker must not be empty".to_string()));
        }
        if spec.taker.is_empty() {
            return Err(EscrowError::Validation("taker must not be empty".to_string()));
        }
        if spec.maker == spec.taker {
            return Err(EscrowError::Validation(
                "maker and taker must differ".to_string(),
            ));
        }
        if spec.asset.is_empty() {
            return Err(EscrowError::Validation("asset must not be empty".to_string()));
        }
        if spec.agreement_hash.is_empty() {
            return Err(EscrowError::Validation(
                "agreement hash must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Insert a trade that is born Funded (funding deadline = now, both
    /// funded flags set). Callers must have run
    /// [`Self::validate_funded_spec`] first.
    pub fn insert_funded(&mut self, spec: FundedTradeSpec, now: u64) -> u64 {
        debug_assert!(Self::validate_funded_spec(&spec).is_ok());

        let id = self.allocate_id();
        self.trades.insert(
            id,
            Trade {
                id,
                maker: spec.maker,
                taker: spec.taker,
                asset: spec.asset,
                price: spec.price,
                deposit: spec.deposit,
                funding_deadline: now,
                direction: spec.direction,
                agreement_hash: spec.agreement_hash,
                status: TradeStatus::Funded,
                disputer: None,
                maker_funded: true,
                taker_funded: true,
                maker_confirmed: false,
                taker_confirmed: false,
            },
        );
        id
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Undo the most recent creation. Only valid for the id returned
    /// by the immediately preceding create; used by composite
    /// operations to stay all-or-nothing.
    pub fn rollback_create(&mut self, id: u64) {
        debug_assert_eq!(id + 1, self.next_id);
        if self.trades.remove(&id).is_some() && id + 1 == self.next_id {
            self.next_id = id;
        }
    }

    pub fn get(&self, id: u64) -> Result<&Trade, EscrowError> {
        self.trades.get(&id).ok_or(EscrowError::TradeNotFound(id))
    }

    pub fn get_mut(&mut self, id: u64) -> Result<&mut Trade, EscrowError> {
        self.trades.get_mut(&id).ok_or(EscrowError::TradeNotFound(id))
    }

    /// Move a trade along the state machine; anything outside the
    /// transition table is an InvalidState error.
    pub fn transition(&mut self, id: u64, next: TradeStatus) -> Result<(), EscrowError> {
        let trade = self.get_mut(id)?;
        if !trade.status.can_transition_to(next) {
            return Err(EscrowError::InvalidState(format!(
                "trade {} cannot move {:?} -> {:?}",
                id, trade.status, next
            )));
        }
        trade.status = next;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn list_by_status(&self, status: TradeStatus) -> Vec<&Trade> {
        let mut trades: Vec<_> = self
            .trades
            .values()
            .filter(|t| t.status == status)
            .collect();
        trades.sort_by_key(|t| t.id);
        trades
    }
}
