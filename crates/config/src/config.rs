use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Hard ceiling on the configurable fee ceiling itself: 100%.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Platform-level configuration for the escrow engine.
///
/// Admin identity, fee rate, and vault are deliberately an explicit
/// object handed to the engine rather than ambient globals; the engine
/// owns its copy and mutates it through the admin operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// The administrative role: resolves disputes, updates fees/vault.
    pub admin: String,

    /// Destination account for collected platform fees.
    pub vault: String,

    /// Fee applied to the price component at settlement, in basis
    /// points.
    #[serde(default = "default_fee_bps")]
    pub fee_bps: u32,

    /// Upper bound the admin may raise `fee_bps` to.
    #[serde(default = "default_max_fee_bps")]
    pub max_fee_bps: u32,

    /// Funding window applied by embedders that do not pass one
    /// explicitly, in seconds.
    #[serde(default = "default_funding_window_secs")]
    pub funding_window_secs: u64,
}

fn default_fee_bps() -> u32 {
    25 // 0.25%
}

fn default_max_fee_bps() -> u32 {
    1_000 // 10%
}

fn default_funding_window_secs() -> u64 {
    86_400 // 24 hours
}

impl PlatformConfig {
    pub fn new(admin: impl Into<String>, vault: impl Into<String>) -> Self {
        Self {
            admin: admin.into(),
            vault: vault.into(),
            fee_bps: default_fee_bps(),
            max_fee_bps: default_max_fee_bps(),
            funding_window_secs: default_funding_window_secs(),
        }
    }

    pub fn with_fee_bps(mut self, fee_bps: u32) -> Self {
        self.fee_bps = fee_bps;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.admin.is_empty() {
            errors.push("admin: must not be empty".to_string());
        }
        if self.vault.is_empty() {
            errors.push("vault: must not be empty".to_string());
        }
        if self.max_fee_bps > BPS_DENOMINATOR {
            errors.push(format!(
                "max_fee_bps: {} exceeds {} (100%)",
                self.max_fee_bps, BPS_DENOMINATOR
            ));
        }
        if self.fee_bps > self.max_fee_bps {
            errors.push(format!(
                "fee_bps: {} exceeds ceiling {}",
                self.fee_bps, self.max_fee_bps
            ));
        }
        if self.funding_window_secs == 0 {
            errors.push("funding_window_secs: must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::ValidationError(errors.join("; ")))
        }
    }
}
