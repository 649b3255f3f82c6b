use serde::{Deserialize, Serialize};

/// Which side of the trade owes the price on top of collateral.
///
/// MakerSells: the maker delivers the priced asset, so the taker pays
/// price + deposit and the maker posts deposit only. MakerBuys is the
/// mirror image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    MakerSells,
    MakerBuys,
}

impl Direction {
    /// The party that owes price + deposit at funding time.
    pub fn price_payer<'a>(&self, maker: &'a str, taker: &'a str) -> &'a str {
        match self {
            Direction::MakerSells => taker,
            Direction::MakerBuys => maker,
        }
    }

    /// The party that owes deposit only at funding time.
    pub fn deposit_only_payer<'a>(&self, maker: &'a str, taker: &'a str) -> &'a str {
        match self {
            Direction::MakerSells => maker,
            Direction::MakerBuys => taker,
        }
    }

    /// The party that receives price + deposit − fee at settlement.
    /// Recipient roles are the inverse of the payer roles.
    pub fn price_recipient<'a>(&self, maker: &'a str, taker: &'a str) -> &'a str {
        match self {
            Direction::MakerSells => maker,
            Direction::MakerBuys => taker,
        }
    }

    /// The party that receives its deposit back at settlement.
    pub fn deposit_recipient<'a>(&self, maker: &'a str, taker: &'a str) -> &'a str {
        match self {
            Direction::MakerSells => taker,
            Direction::MakerBuys => maker,
        }
    }
}

/// Trade lifecycle status.
///
/// Transitions are strictly forward-moving except the single
/// Disputed → Funded edge (a cancelled or administratively cleared
/// dispute returns the trade to the confirm/settle path).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeStatus {
    /// Created, waiting for one or both parties to fund.
    Open,
    /// Both parties funded; waiting for mutual confirmation.
    Funded,
    /// Both parties confirmed; escrow paid out.
    Settled,
    /// Funding deadline passed without full funding.
    Cancelled,
    /// A participant raised a dispute; only the arbiter or the
    /// disputer can move the trade on.
    Disputed,
    /// Closed by administrative resolution or withdrawal.
    AdminClosed,
}

impl TradeStatus {
    /// The transition table. Every status mutation in the registry is
    /// checked against this; nothing else moves a trade.
    pub fn can_transition_to(self, next: TradeStatus) -> bool {
        use TradeStatus::*;
        matches!(
            (self, next),
            (Open, Funded)
                | (Open, Cancelled)
                | (Funded, Settled)
                | (Funded, Disputed)
                | (Disputed, Funded)
                | (Disputed, AdminClosed)
        )
    }

    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TradeStatus::Settled | TradeStatus::Cancelled | TradeStatus::AdminClosed
        )
    }
}

/// A trade participant's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Maker,
    Taker,
}

impl Role {
    pub fn counterparty(self) -> Role {
        match self {
            Role::Maker => Role::Taker,
            Role::Taker => Role::Maker,
        }
    }
}

/// A single escrowed trade. Owned exclusively by the registry once
/// created; all mutation goes through it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Monotonically increasing identifier, assigned at creation.
    pub id: u64,

    /// Counterparties. The taker is always the creator of a direct
    /// trade; maker and taker must differ.
    pub maker: String,
    pub taker: String,

    /// Custody ledger asset this trade escrows.
    pub asset: String,

    /// Amounts in smallest denomination units. Price may be zero only
    /// for matcher-created trades with computed totals.
    pub price: u128,
    pub deposit: u128,

    /// Absolute timestamp after which an Open trade can be cancelled.
    pub funding_deadline: u64,

    pub direction: Direction,

    /// Commitment to the off-system terms; never empty.
    pub agreement_hash: String,

    pub status: TradeStatus,

    /// Set only while Disputed; identifies who may cancel the dispute.
    pub disputer: Option<String>,

    /// Each settable true exactly once; cleared only by a refund claim.
    pub maker_funded: bool,
    pub taker_funded: bool,

    /// Each settable true exactly once; never cleared.
    pub maker_confirmed: bool,
    pub taker_confirmed: bool,
}

impl Trade {
    pub fn role_of(&self, party: &str) -> Option<Role> {
        if party == self.maker {
            Some(Role::Maker)
        } else if party == self.taker {
            Some(Role::Taker)
        } else {
            None
        }
    }

    pub fn party(&self, role: Role) -> &str {
        match role {
            Role::Maker => &self.maker,
            Role::Taker => &self.taker,
        }
    }

    pub fn is_funded_by(&self, role: Role) -> bool {
        match role {
            Role::Maker => self.maker_funded,
            Role::Taker => self.taker_funded,
        }
    }

    pub fn set_funded(&mut self, role: Role, funded: bool) {
        match role {
            Role::Maker => self.maker_funded = funded,
            Role::Taker => self.taker_funded = funded,
        }
    }

    pub fn is_confirmed_by(&self, role: Role) -> bool {
        match role {
            Role::Maker => self.maker_confirmed,
            Role::Taker => self.taker_confirmed,
        }
    }

    pub fn set_confirmed(&mut self, role: Role) {
        match role {
            Role::Maker => self.maker_confirmed = true,
            Role::Taker => self.taker_confirmed = true,
        }
    }

    pub fn fully_funded(&self) -> bool {
        self.maker_funded && self.taker_funded
    }

    pub fn fully_confirmed(&self) -> bool {
        self.maker_confirmed && self.taker_confirmed
    }

    /// Everything the custody pool should hold for this trade once it
    /// is fully funded.
    pub fn total_escrow(&self) -> Option<u128> {
        self.price.checked_add(self.deposit.checked_mul(2)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_trade() -> Trade {
        Trade {
            id: 1,
            maker: "maker".to_string(),
            taker: "taker".to_string(),
            asset: "usd".to_string(),
            price: 10_000,
            deposit: 5_000,
            funding_deadline: 1_000,
            direction: Direction::MakerSells,
            agreement_hash: "a1b2".to_string(),
            status: TradeStatus::Open,
            disputer: None,
            maker_funded: false,
            taker_funded: false,
            maker_confirmed: false,
            taker_confirmed: false,
        }
    }

    #[test]
    fn test_direction_role_mapping() {
        let d = Direction::MakerSells;
        assert_eq!(d.price_payer("m", "t"), "t");
        assert_eq!(d.deposit_only_payer("m", "t"), "m");
        assert_eq!(d.price_recipient("m", "t"), "m");
        assert_eq!(d.deposit_recipient("m", "t"), "t");

        let d = Direction::MakerBuys;
        assert_eq!(d.price_payer("m", "t"), "m");
        assert_eq!(d.deposit_only_payer("m", "t"), "t");
        assert_eq!(d.price_recipient("m", "t"), "t");
        assert_eq!(d.deposit_recipient("m", "t"), "m");
    }

    #[test]
    fn test_recipient_is_inverse_of_payer() {
        for d in [Direction::MakerSells, Direction::MakerBuys] {
            assert_eq!(d.price_payer("m", "t"), d.deposit_recipient("m", "t"));
            assert_eq!(d.deposit_only_payer("m", "t"), d.price_recipient("m", "t"));
        }
    }

    #[test]
    fn test_transition_table_allows_lifecycle_edges() {
        use TradeStatus::*;
        assert!(Open.can_transition_to(Funded));
        assert!(Open.can_transition_to(Cancelled));
        assert!(Funded.can_transition_to(Settled));
        assert!(Funded.can_transition_to(Disputed));
        assert!(Disputed.can_transition_to(Funded));
        assert!(Disputed.can_transition_to(AdminClosed));
    }

    #[test]
    fn test_transition_table_rejects_everything_else() {
        use TradeStatus::*;
        let all = [Open, Funded, Settled, Cancelled, Disputed, AdminClosed];
        let allowed = [
            (Open, Funded),
            (Open, Cancelled),
            (Funded, Settled),
            (Funded, Disputed),
            (Disputed, Funded),
            (Disputed, AdminClosed),
        ];
        for from in all {
            for to in all {
                let expected = allowed.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "transition {:?} -> {:?}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_terminal_statuses() {
        use TradeStatus::*;
        for s in [Settled, Cancelled, AdminClosed] {
            assert!(s.is_terminal());
            for next in [Open, Funded, Settled, Cancelled, Disputed, AdminClosed] {
                assert!(!s.can_transition_to(next));
            }
        }
        assert!(!Open.is_terminal());
        assert!(!Funded.is_terminal());
        assert!(!Disputed.is_terminal());
    }

    #[test]
    fn test_role_lookup() {
        let trade = make_trade();
        assert_eq!(trade.role_of("maker"), Some(Role::Maker));
        assert_eq!(trade.role_of("taker"), Some(Role::Taker));
        assert_eq!(trade.role_of("stranger"), None);
        assert_eq!(trade.party(Role::Maker), "maker");
        assert_eq!(Role::Maker.counterparty(), Role::Taker);
    }

    #[test]
    fn test_funded_and_confirmed_flags() {
        let mut trade = make_trade();
        assert!(!trade.fully_funded());

        trade.set_funded(Role::Maker, true);
        assert!(trade.is_funded_by(Role::Maker));
        assert!(!trade.fully_funded());

        trade.set_funded(Role::Taker, true);
        assert!(trade.fully_funded());

        trade.set_confirmed(Role::Taker);
        assert!(trade.is_confirmed_by(Role::Taker));
        assert!(!trade.fully_confirmed());
        trade.set_confirmed(Role::Maker);
        assert!(trade.fully_confirmed());
    }

    #[test]
    fn test_total_escrow() {
        let trade = make_trade();
        assert_eq!(trade.total_escrow(), Some(20_000));

        let mut huge = make_trade();
        huge.deposit = u128::MAX;
        assert_eq!(huge.total_escrow(), None);
    }
}
