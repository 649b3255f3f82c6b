use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::{Direction, SellOrder, PROTOCOL_VERSION};

/// Encoding tag hashed ahead of every order digest. Bump on any change
/// to the field layout below.
const ORDER_DIGEST_TAG: &[u8] = b"PACT/SELL-ORDER";

/// Context that binds a signature to one deployment of the system.
///
/// Two deployments with different domains produce different digests for
/// byte-identical orders, so a signature captured on one cannot be
/// replayed against the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignDomain {
    /// Platform name, e.g. "pact".
    pub platform: String,

    /// Digest layout version.
    pub version: String,

    /// Deployment instance identifier (chain id, environment name).
    pub instance: String,
}

impl SignDomain {
    pub fn new(platform: impl Into<String>, instance: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            version: PROTOCOL_VERSION.to_string(),
            instance: instance.into(),
        }
    }
}

/// Canonical 32-byte order digest: the signing payload and the
/// fill-tracking key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderDigest(pub [u8; 32]);

impl OrderDigest {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for OrderDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Compute the canonical digest of an order under a domain.
///
/// Every field participates, strings are length-delimited and integers
/// fixed-width, so no two distinct (domain, order) pairs share an
/// encoding.
pub fn order_digest(domain: &SignDomain, order: &SellOrder) -> OrderDigest {
    let mut hasher = Sha256::new();
    hasher.update(ORDER_DIGEST_TAG);

    update_str(&mut hasher, &domain.platform);
    update_str(&mut hasher, &domain.version);
    update_str(&mut hasher, &domain.instance);

    update_str(&mut hasher, &order.maker);
    update_str(&mut hasher, &order.asset);
    hasher.update(order.unit_price.to_le_bytes());
    hasher.update(order.unit_deposit.to_le_bytes());
    hasher.update(order.total_quantity.to_le_bytes());
    hasher.update(order.min_fill_amount.to_le_bytes());
    hasher.update(order.expiry.to_le_bytes());
    hasher.update(order.nonce.to_le_bytes());
    match &order.allowed_buyer {
        Some(buyer) => {
            hasher.update([1u8]);
            update_str(&mut hasher, buyer);
        }
        None => hasher.update([0u8]),
    }
    hasher.update([match order.direction {
        Direction::MakerSells => 0u8,
        Direction::MakerBuys => 1u8,
    }]);
    update_str(&mut hasher, &order.agreement_hash);

    OrderDigest(hasher.finalize().into())
}

fn update_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain() -> SignDomain {
        SignDomain::new("pact", "mainnet-1")
    }

    fn make_order() -> SellOrder {
        SellOrder {
            maker: "maker".to_string(),
            asset: "usd".to_string(),
            unit_price: 100,
            unit_deposit: 50,
            total_quantity: 1_000,
            min_fill_amount: 10,
            expiry: 5_000,
            nonce: 7,
            allowed_buyer: None,
            direction: Direction::MakerSells,
            agreement_hash: "terms".to_string(),
        }
    }

    #[test]
    fn test_digest_is_deterministic() {
        let d1 = order_digest(&domain(), &make_order());
        let d2 = order_digest(&domain(), &make_order());
        assert_eq!(d1, d2);
    }

    #[test]
    fn test_every_field_perturbs_digest() {
        let base = order_digest(&domain(), &make_order());

        let variants: Vec<SellOrder> = vec![
            SellOrder {
                maker: "other".to_string(),
                ..make_order()
            },
            SellOrder {
                asset: "eur".to_string(),
                ..make_order()
            },
            SellOrder {
                unit_price: 101,
                ..make_order()
            },
            SellOrder {
                unit_deposit: 51,
                ..make_order()
            },
            SellOrder {
                total_quantity: 999,
                ..make_order()
            },
            SellOrder {
                min_fill_amount: 11,
                ..make_order()
            },
            SellOrder {
                expiry: 5_001,
                ..make_order()
            },
            SellOrder {
                nonce: 8,
                ..make_order()
            },
            SellOrder {
                allowed_buyer: Some("vip".to_string()),
                ..make_order()
            },
            SellOrder {
                direction: Direction::MakerBuys,
                ..make_order()
            },
            SellOrder {
                agreement_hash: "other-terms".to_string(),
                ..make_order()
            },
        ];

        for (i, variant) in variants.iter().enumerate() {
            assert_ne!(
                order_digest(&domain(), variant),
                base,
                "field variant {} did not change the digest",
                i
            );
        }
    }

    #[test]
    fn test_domain_perturbs_digest() {
        let order = make_order();
        let base = order_digest(&domain(), &order);

        assert_ne!(order_digest(&SignDomain::new("pact", "testnet-2"), &order), base);
        assert_ne!(order_digest(&SignDomain::new("other", "mainnet-1"), &order), base);
    }

    #[test]
    fn test_length_delimiting_prevents_field_smearing() {
        // "ab" + "c" must not collide with "a" + "bc".
        let mut o1 = make_order();
        o1.maker = "ab".to_string();
        o1.asset = "c".to_string();

        let mut o2 = make_order();
        o2.maker = "a".to_string();
        o2.asset = "bc".to_string();

        assert_ne!(order_digest(&domain(), &o1), order_digest(&domain(), &o2));
    }

    #[test]
    fn test_display_is_hex() {
        let d = order_digest(&domain(), &make_order());
        let s = d.to_string();
        assert_eq!(s.len(), 64);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
