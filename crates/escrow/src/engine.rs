use std::sync::Arc;

use pact_config::PlatformConfig;
use pact_matcher::{FillOutcome, SignedOrderBook};
use pact_types::{SellOrder, SignDomain, SignatureVerifier, Trade, TradeStatus};
use tracing::{debug, error, info};

use crate::{
    required_amount, required_funding, AssetLedger, CallGuard, EscrowError, EscrowEvent,
    FundedTradeSpec, SettlementSplit, TradeRegistry, TradeRequest,
};

/// The escrow engine: one instance owns the trade table, the signed-
/// order replay state, and the platform configuration, and brokers
/// every fund movement through the injected ledger capability.
///
/// Methods take `&mut self`; the embedding environment serializes
/// calls. The call guard exists for the one hole in that model: ledger
/// callbacks re-entering the engine mid-transfer.
pub struct EscrowEngine {
    config: PlatformConfig,
    registry: TradeRegistry,
    orders: SignedOrderBook,
    ledger: Arc<dyn AssetLedger>,
    guard: CallGuard,
    events: Vec<EscrowEvent>,
}

impl EscrowEngine {
    pub fn new(
        config: PlatformConfig,
        domain: SignDomain,
        verifier: Arc<dyn SignatureVerifier>,
        ledger: Arc<dyn AssetLedger>,
    ) -> Result<Self, EscrowError> {
        config
            .validate()
            .map_err(|e| EscrowError::Validation(e.to_string()))?;

        Ok(Self {
            config,
            registry: TradeRegistry::new(),
            orders: SignedOrderBook::new(domain, verifier),
            ledger,
            guard: CallGuard::new(),
            events: Vec::new(),
        })
    }

    // ═══════════════════════════════════════════════════════════════════
    // TRADE CREATION & FUNDING
    // ═══════════════════════════════════════════════════════════════════

    /// Create a direct trade. The caller becomes the taker.
    pub fn create_trade(
        &mut self,
        caller: &str,
        request: TradeRequest,
        now: u64,
    ) -> Result<u64, EscrowError> {
        let id = self.registry.create(caller, request, now)?;

        let trade = self.registry.get(id)?;
        let event = EscrowEvent::TradeCreated {
            id,
            maker: trade.maker.clone(),
            taker: trade.taker.clone(),
            agreement_hash: trade.agreement_hash.clone(),
            price: trade.price,
        };
        self.emit(event);
        Ok(id)
    }

    /// Deposit a participant's required amount into custody.
    pub async fn fund(
        &mut self,
        trade_id: u64,
        caller: &str,
        now: u64,
    ) -> Result<(), EscrowError> {
        let _scope = self.guard.enter()?;

        let amount = self.apply_funding(trade_id, caller, now).await?;
        self.emit(EscrowEvent::TradeFunded {
            id: trade_id,
            funder: caller.to_string(),
            amount,
        });
        Ok(())
    }

    /// Create and taker-fund in one atomic call, available only to the
    /// creator. Runs a capacity pre-flight before mutating anything;
    /// never funds the maker side.
    pub async fn create_trade_with_fund(
        &mut self,
        caller: &str,
        request: TradeRequest,
        now: u64,
    ) -> Result<u64, EscrowError> {
        let _scope = self.guard.enter()?;

        let taker_is_price_payer =
            request.direction.price_payer(&request.maker, caller) == caller;
        let required = required_amount(taker_is_price_payer, request.price, request.deposit)?;
        let authorized = self.ledger.authorized(&request.asset, caller).await?;
        if authorized < required {
            return Err(EscrowError::Validation(format!(
                "pre-authorized amount {} below required {} for composite create",
                authorized, required
            )));
        }

        let maker = request.maker.clone();
        let agreement_hash = request.agreement_hash.clone();
        let price = request.price;

        let id = self.registry.create(caller, request, now)?;
        let amount = match self.apply_funding(id, caller, now).await {
            Ok(amount) => amount,
            Err(e) => {
                self.registry.rollback_create(id);
                return Err(e);
            }
        };

        self.emit(EscrowEvent::TradeCreated {
            id,
            maker,
            taker: caller.to_string(),
            agreement_hash,
            price,
        });
        self.emit(EscrowEvent::TradeFunded {
            id,
            funder: caller.to_string(),
            amount,
        });
        Ok(id)
    }

    /// Checks, flag update, status promotion, then the custody pull.
    /// State changes land before the external call (closing the
    /// reentrancy window) and are restored if the pull fails.
    async fn apply_funding(
        &mut self,
        trade_id: u64,
        caller: &str,
        now: u64,
    ) -> Result<u128, EscrowError> {
        let (snapshot, asset, amount, fully_funded) = {
            let trade = self.registry.get_mut(trade_id)?;
            if trade.status != TradeStatus::Open {
                return Err(EscrowError::InvalidState(format!(
                    "trade {} is {:?}, funding requires Open",
                    trade_id, trade.status
                )));
            }
            if now > trade.funding_deadline {
                return Err(EscrowError::InvalidState(format!(
                    "funding deadline passed for trade {}",
                    trade_id
                )));
            }
            let role = trade.role_of(caller).ok_or_else(|| {
                EscrowError::Authorization(format!(
                    "{} is not a participant of trade {}",
                    caller, trade_id
                ))
            })?;
            if trade.is_funded_by(role) {
                return Err(EscrowError::DoubleAction(format!(
                    "{} already funded trade {}",
                    caller, trade_id
                )));
            }
            let required = required_funding(trade, role)?;

            let snapshot = trade.clone();
            trade.set_funded(role, true);
            (snapshot, trade.asset.clone(), required, trade.fully_funded())
        };

        if fully_funded {
            self.registry.transition(trade_id, TradeStatus::Funded)?;
        }

        if let Err(e) = self.ledger.transfer_in(&asset, caller, amount).await {
            *self.registry.get_mut(trade_id)? = snapshot;
            return Err(e.into());
        }

        debug!(trade_id, funder = caller, amount, "funding recorded");
        Ok(amount)
    }

    // ═══════════════════════════════════════════════════════════════════
    // CONFIRMATION & SETTLEMENT
    // ═══════════════════════════════════════════════════════════════════

    /// Record a participant's completion confirmation; the second
    /// confirmation triggers settlement in the same call.
    pub async fn confirm(&mut self, trade_id: u64, caller: &str) -> Result<(), EscrowError> {
        let _scope = self.guard.enter()?;

        let (snapshot, fully_confirmed) = {
            let trade = self.registry.get_mut(trade_id)?;
            if trade.status != TradeStatus::Funded {
                return Err(EscrowError::InvalidState(format!(
                    "trade {} is {:?}, confirmation requires Funded",
                    trade_id, trade.status
                )));
            }
            let role = trade.role_of(caller).ok_or_else(|| {
                EscrowError::Authorization(format!(
                    "{} is not a participant of trade {}",
                    caller, trade_id
                ))
            })?;
            if trade.is_confirmed_by(role) {
                return Err(EscrowError::DoubleAction(format!(
                    "{} already confirmed trade {}",
                    caller, trade_id
                )));
            }

            let snapshot = trade.clone();
            trade.set_confirmed(role);
            (snapshot, trade.fully_confirmed())
        };

        if !fully_confirmed {
            self.emit(EscrowEvent::TradeConfirmed {
                id: trade_id,
                confirmer: caller.to_string(),
            });
            return Ok(());
        }

        match self.settle(trade_id).await {
            Ok(fee) => {
                self.emit(EscrowEvent::TradeConfirmed {
                    id: trade_id,
                    confirmer: caller.to_string(),
                });
                self.emit(EscrowEvent::TradeSettled { id: trade_id, fee });
                Ok(())
            }
            Err(e) => {
                // All-or-nothing: the triggering confirmation does not
                // stick if settlement fails.
                *self.registry.get_mut(trade_id)? = snapshot;
                Err(e)
            }
        }
    }

    /// Pay out a fully confirmed trade. Reachable only through
    /// [`Self::confirm`], which owns the rollback.
    async fn settle(&mut self, trade_id: u64) -> Result<u128, EscrowError> {
        let (asset, split, price_recipient, deposit_recipient) = {
            let trade = self.registry.get(trade_id)?;
            let split = SettlementSplit::compute(trade.price, trade.deposit, self.config.fee_bps)?;
            (
                trade.asset.clone(),
                split,
                trade
                    .direction
                    .price_recipient(&trade.maker, &trade.taker)
                    .to_string(),
                trade
                    .direction
                    .deposit_recipient(&trade.maker, &trade.taker)
                    .to_string(),
            )
        };

        self.registry.transition(trade_id, TradeStatus::Settled)?;

        // Custody short of the recorded escrow means the pool was
        // drained by something outside this trade's bookkeeping.
        let have = self.ledger.balance_of(&asset).await?;
        if have < split.total_escrow {
            return Err(EscrowError::InsufficientCustody {
                asset,
                have,
                need: split.total_escrow,
            });
        }

        if split.fee > 0 {
            self.ledger
                .transfer_out(&asset, &self.config.vault, split.fee)
                .await?;
        }
        self.ledger
            .transfer_out(&asset, &price_recipient, split.price_recipient_payout)
            .await?;
        self.ledger
            .transfer_out(&asset, &deposit_recipient, split.deposit_recipient_payout)
            .await?;

        info!(trade_id, fee = split.fee, "trade settled");
        Ok(split.fee)
    }

    // ═══════════════════════════════════════════════════════════════════
    // DISPUTES
    // ═══════════════════════════════════════════════════════════════════

    pub fn raise_dispute(&mut self, trade_id: u64, caller: &str) -> Result<(), EscrowError> {
        {
            let trade = self.registry.get(trade_id)?;
            if trade.status != TradeStatus::Funded {
                return Err(EscrowError::InvalidState(format!(
                    "trade {} is {:?}, disputes require Funded",
                    trade_id, trade.status
                )));
            }
            trade.role_of(caller).ok_or_else(|| {
                EscrowError::Authorization(format!(
                    "{} is not a participant of trade {}",
                    caller, trade_id
                ))
            })?;
        }

        self.registry.transition(trade_id, TradeStatus::Disputed)?;
        self.registry.get_mut(trade_id)?.disputer = Some(caller.to_string());

        self.emit(EscrowEvent::TradeDisputed {
            id: trade_id,
            disputer: caller.to_string(),
        });
        Ok(())
    }

    /// Only the party that raised a dispute may withdraw it.
    pub fn cancel_dispute(&mut self, trade_id: u64, caller: &str) -> Result<(), EscrowError> {
        {
            let trade = self.registry.get(trade_id)?;
            if trade.status != TradeStatus::Disputed {
                return Err(EscrowError::InvalidState(format!(
                    "trade {} is {:?}, expected Disputed",
                    trade_id, trade.status
                )));
            }
            if trade.disputer.as_deref() != Some(caller) {
                return Err(EscrowError::Authorization(format!(
                    "only the disputer may cancel the dispute on trade {}",
                    trade_id
                )));
            }
        }

        self.registry.transition(trade_id, TradeStatus::Funded)?;
        self.registry.get_mut(trade_id)?.disputer = None;

        self.emit(EscrowEvent::DisputeCancelled {
            id: trade_id,
            resolver: caller.to_string(),
        });
        Ok(())
    }

    /// Fail-safe escape hatch: pull the whole escrow to the
    /// administrative role for off-system handling.
    pub async fn admin_withdraw(
        &mut self,
        trade_id: u64,
        caller: &str,
    ) -> Result<(), EscrowError> {
        let _scope = self.guard.enter()?;
        self.require_admin(caller)?;

        let (snapshot, asset, total) = {
            let trade = self.registry.get(trade_id)?;
            if trade.status != TradeStatus::Disputed {
                return Err(EscrowError::InvalidState(format!(
                    "trade {} is {:?}, expected Disputed",
                    trade_id, trade.status
                )));
            }
            let total = trade
                .total_escrow()
                .ok_or_else(|| EscrowError::Overflow("price + 2 * deposit".to_string()))?;
            (trade.clone(), trade.asset.clone(), total)
        };

        self.registry.transition(trade_id, TradeStatus::AdminClosed)?;
        self.registry.get_mut(trade_id)?.disputer = None;

        let result = async {
            let have = self.ledger.balance_of(&asset).await?;
            if have < total {
                return Err(EscrowError::InsufficientCustody {
                    asset: asset.clone(),
                    have,
                    need: total,
                });
            }
            self.ledger
                .transfer_out(&asset, &self.config.admin, total)
                .await?;
            Ok(())
        }
        .await;

        if let Err(e) = result {
            *self.registry.get_mut(trade_id)? = snapshot;
            return Err(e);
        }

        self.emit(EscrowEvent::AdminWithdrawal {
            id: trade_id,
            admin: caller.to_string(),
            amount: total,
        });
        Ok(())
    }

    /// Award the whole escrow (minus the platform fee) to one side.
    pub async fn admin_resolve_dispute(
        &mut self,
        trade_id: u64,
        caller: &str,
        winner: &str,
        reason: &str,
    ) -> Result<(), EscrowError> {
        let _scope = self.guard.enter()?;
        self.require_admin(caller)?;

        let (snapshot, asset, fee, remainder, loser) = {
            let trade = self.registry.get(trade_id)?;
            if trade.status != TradeStatus::Disputed {
                return Err(EscrowError::InvalidState(format!(
                    "trade {} is {:?}, expected Disputed",
                    trade_id, trade.status
                )));
            }
            let winner_role = trade.role_of(winner).ok_or_else(|| {
                EscrowError::Validation(format!(
                    "winner {} must be the maker or taker of trade {}",
                    winner, trade_id
                ))
            })?;
            let split = SettlementSplit::compute(trade.price, trade.deposit, self.config.fee_bps)?;
            (
                trade.clone(),
                trade.asset.clone(),
                split.fee,
                split.total_escrow - split.fee,
                trade.party(winner_role.counterparty()).to_string(),
            )
        };

        self.registry.transition(trade_id, TradeStatus::AdminClosed)?;
        self.registry.get_mut(trade_id)?.disputer = None;

        let result = async {
            if fee > 0 {
                self.ledger
                    .transfer_out(&asset, &self.config.vault, fee)
                    .await?;
            }
            self.ledger.transfer_out(&asset, winner, remainder).await?;
            Ok::<(), EscrowError>(())
        }
        .await;

        if let Err(e) = result {
            *self.registry.get_mut(trade_id)? = snapshot;
            return Err(e);
        }

        info!(trade_id, winner, loser = %loser, fee, "dispute resolved");
        self.emit(EscrowEvent::DisputeResolved {
            id: trade_id,
            winner: winner.to_string(),
            loser,
            fee,
            reason: reason.to_string(),
        });
        Ok(())
    }

    /// Dismiss a dispute without moving funds, returning the trade to
    /// the normal confirm/settle path. The custody check is a sanity
    /// assertion on the aggregate pool, nothing is earmarked.
    pub async fn admin_clear_dispute(
        &mut self,
        trade_id: u64,
        caller: &str,
        reason: &str,
    ) -> Result<(), EscrowError> {
        let _scope = self.guard.enter()?;
        self.require_admin(caller)?;

        let (asset, total) = {
            let trade = self.registry.get(trade_id)?;
            if trade.status != TradeStatus::Disputed {
                return Err(EscrowError::InvalidState(format!(
                    "trade {} is {:?}, expected Disputed",
                    trade_id, trade.status
                )));
            }
            let total = trade
                .total_escrow()
                .ok_or_else(|| EscrowError::Overflow("price + 2 * deposit".to_string()))?;
            (trade.asset.clone(), total)
        };

        let have = self.ledger.balance_of(&asset).await?;
        if have < total {
            return Err(EscrowError::InsufficientCustody {
                asset,
                have,
                need: total,
            });
        }

        self.registry.transition(trade_id, TradeStatus::Funded)?;
        self.registry.get_mut(trade_id)?.disputer = None;

        self.emit(EscrowEvent::DisputeCleared {
            id: trade_id,
            admin: caller.to_string(),
            reason: reason.to_string(),
        });
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // CANCELLATION & REFUNDS
    // ═══════════════════════════════════════════════════════════════════

    /// Cancel a trade stuck Open past its funding deadline. Callable by
    /// anyone; a fully funded trade must settle or dispute instead.
    pub fn cancel(&mut self, trade_id: u64, now: u64) -> Result<(), EscrowError> {
        {
            let trade = self.registry.get(trade_id)?;
            if trade.status != TradeStatus::Open {
                return Err(EscrowError::InvalidState(format!(
                    "trade {} is {:?}, cancellation requires Open",
                    trade_id, trade.status
                )));
            }
            if now <= trade.funding_deadline {
                return Err(EscrowError::InvalidState(format!(
                    "funding deadline for trade {} has not passed",
                    trade_id
                )));
            }
            if trade.fully_funded() {
                return Err(EscrowError::InvalidState(format!(
                    "trade {} is fully funded and must settle or dispute",
                    trade_id
                )));
            }
        }

        self.registry.transition(trade_id, TradeStatus::Cancelled)?;
        self.emit(EscrowEvent::TradeCancelled { id: trade_id });
        Ok(())
    }

    /// Return a funded party's deposit (and price, if it paid one)
    /// after cancellation. Clearing the funded flag makes the claim
    /// exactly-once.
    pub async fn claim_refund(
        &mut self,
        trade_id: u64,
        caller: &str,
    ) -> Result<u128, EscrowError> {
        let _scope = self.guard.enter()?;

        let (snapshot, asset, refund) = {
            let trade = self.registry.get_mut(trade_id)?;
            if trade.status != TradeStatus::Cancelled {
                return Err(EscrowError::InvalidState(format!(
                    "trade {} is {:?}, refunds require Cancelled",
                    trade_id, trade.status
                )));
            }
            let role = trade.role_of(caller).ok_or_else(|| {
                EscrowError::Authorization(format!(
                    "{} is not a participant of trade {}",
                    caller, trade_id
                ))
            })?;
            if !trade.is_funded_by(role) {
                return Err(EscrowError::Validation(format!(
                    "{} has nothing to claim on trade {}",
                    caller, trade_id
                )));
            }
            let refund = required_funding(trade, role)?;

            let snapshot = trade.clone();
            trade.set_funded(role, false);
            (snapshot, trade.asset.clone(), refund)
        };

        if let Err(e) = self.ledger.transfer_out(&asset, caller, refund).await {
            *self.registry.get_mut(trade_id)? = snapshot;
            return Err(e.into());
        }

        self.emit(EscrowEvent::RefundClaimed {
            id: trade_id,
            claimer: caller.to_string(),
            amount: refund,
        });
        Ok(refund)
    }

    // ═══════════════════════════════════════════════════════════════════
    // SIGNED ORDERS
    // ═══════════════════════════════════════════════════════════════════

    /// Fill a maker-signed order, producing a trade that is born
    /// Funded. Returns the new trade id.
    pub async fn fill_signed_order(
        &mut self,
        caller: &str,
        order: &SellOrder,
        fill_amount: u128,
        signature: &[u8],
        pre_auth: Option<&[u8]>,
        now: u64,
    ) -> Result<u64, EscrowError> {
        let _scope = self.guard.enter()?;

        let fill = self
            .orders
            .validate_fill(order, caller, fill_amount, signature, now)?;

        let spec = FundedTradeSpec {
            maker: order.maker.clone(),
            taker: caller.to_string(),
            asset: order.asset.clone(),
            price: fill.total_price,
            deposit: fill.total_deposit,
            direction: order.direction,
            agreement_hash: order.agreement_hash.clone(),
        };
        TradeRegistry::validate_funded_spec(&spec)?;

        let maker_is_price_payer =
            order.direction.price_payer(&order.maker, caller) == order.maker;
        let maker_amount =
            required_amount(maker_is_price_payer, fill.total_price, fill.total_deposit)?;
        let taker_amount =
            required_amount(!maker_is_price_payer, fill.total_price, fill.total_deposit)?;

        // Best-effort: the maker may have routed authorization through
        // another channel, so a failure here is advisory only. The
        // pulls below are what actually enforce authorization.
        if let Some(payload) = pre_auth {
            if let Err(e) = self
                .ledger
                .apply_pre_authorization(&order.asset, &order.maker, payload)
                .await
            {
                debug!(maker = %order.maker, error = %e, "pre-authorization failed; continuing");
            }
        }

        self.ledger
            .transfer_in(&order.asset, &order.maker, maker_amount)
            .await?;
        if let Err(e) = self.ledger.transfer_in(&order.asset, caller, taker_amount).await {
            // Unwind the maker's pull so the aborted fill leaves no
            // partial effect.
            if let Err(comp) = self
                .ledger
                .transfer_out(&order.asset, &order.maker, maker_amount)
                .await
            {
                error!(
                    maker = %order.maker,
                    amount = maker_amount,
                    error = %comp,
                    "failed to unwind maker pull after aborted fill"
                );
            }
            return Err(e.into());
        }

        let outcome = self.orders.apply_fill(order, &fill).map_err(EscrowError::from)?;
        let trade_id = self.registry.insert_funded(spec, now);

        match outcome {
            FillOutcome::Partial { remaining } => self.emit(EscrowEvent::OrderPartiallyFilled {
                digest: fill.digest,
                taker: caller.to_string(),
                fill_amount,
                remaining,
            }),
            FillOutcome::Complete => self.emit(EscrowEvent::OrderFullyFilled {
                digest: fill.digest,
                last_taker: caller.to_string(),
            }),
        }
        self.emit(EscrowEvent::TradeCreated {
            id: trade_id,
            maker: order.maker.clone(),
            taker: caller.to_string(),
            agreement_hash: order.agreement_hash.clone(),
            price: fill.total_price,
        });
        self.emit(EscrowEvent::TradeFunded {
            id: trade_id,
            funder: order.maker.clone(),
            amount: maker_amount,
        });
        self.emit(EscrowEvent::TradeFunded {
            id: trade_id,
            funder: caller.to_string(),
            amount: taker_amount,
        });
        Ok(trade_id)
    }

    /// Preemptively consume one of the caller's nonces so nothing
    /// signed under it can ever fill.
    pub fn cancel_signed_order(&mut self, caller: &str, nonce: u64) -> Result<(), EscrowError> {
        self.orders
            .cancel_nonce(caller, nonce)
            .map_err(EscrowError::from)
    }

    /// Unfilled quantity left on an order. Read-only.
    pub fn remaining_quantity(
        &self,
        order: &SellOrder,
        signature: &[u8],
    ) -> Result<u128, EscrowError> {
        self.orders
            .remaining_quantity(order, signature)
            .map_err(EscrowError::from)
    }

    // ═══════════════════════════════════════════════════════════════════
    // ADMINISTRATION
    // ═══════════════════════════════════════════════════════════════════

    pub fn set_platform_fee(&mut self, caller: &str, new_bps: u32) -> Result<(), EscrowError> {
        self.require_admin(caller)?;
        if new_bps > self.config.max_fee_bps {
            return Err(EscrowError::Validation(format!(
                "fee {} bps exceeds ceiling {} bps",
                new_bps, self.config.max_fee_bps
            )));
        }
        self.config.fee_bps = new_bps;
        self.emit(EscrowEvent::FeeUpdated { new_bps });
        Ok(())
    }

    pub fn set_vault(&mut self, caller: &str, new_vault: &str) -> Result<(), EscrowError> {
        self.require_admin(caller)?;
        if new_vault.is_empty() {
            return Err(EscrowError::Validation("vault must not be empty".to_string()));
        }
        self.config.vault = new_vault.to_string();
        self.emit(EscrowEvent::VaultUpdated {
            new_vault: new_vault.to_string(),
        });
        Ok(())
    }

    pub fn set_admin(&mut self, caller: &str, new_admin: &str) -> Result<(), EscrowError> {
        self.require_admin(caller)?;
        if new_admin.is_empty() {
            return Err(EscrowError::Validation("admin must not be empty".to_string()));
        }
        self.config.admin = new_admin.to_string();
        self.emit(EscrowEvent::AdminUpdated {
            new_admin: new_admin.to_string(),
        });
        Ok(())
    }

    fn require_admin(&self, caller: &str) -> Result<(), EscrowError> {
        if caller != self.config.admin {
            return Err(EscrowError::Authorization(format!(
                "{} is not the administrator",
                caller
            )));
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // OBSERVATION
    // ═══════════════════════════════════════════════════════════════════

    pub fn trade(&self, trade_id: u64) -> Result<&Trade, EscrowError> {
        self.registry.get(trade_id)
    }

    pub fn trades_by_status(&self, status: TradeStatus) -> Vec<&Trade> {
        self.registry.list_by_status(status)
    }

    pub fn trade_count(&self) -> usize {
        self.registry.len()
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    /// A handle to the engine's reentrancy guard, shareable with
    /// ledger implementations and tests.
    pub fn guard_handle(&self) -> CallGuard {
        self.guard.clone()
    }

    /// Events emitted since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<EscrowEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[EscrowEvent] {
        &self.events
    }

    fn emit(&mut self, event: EscrowEvent) {
        info!(?event, "escrow event");
        self.events.push(event);
    }
}
