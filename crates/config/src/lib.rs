//! Platform configuration: the administrative identity, fee schedule,
//! and payout vault injected into the escrow engine, plus file loading
//! and validation.

mod config;
mod loader;

pub use config::*;
pub use loader::*;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    LoadError(String),

    #[error("config validation failed: {0}")]
    ValidationError(String),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("toml parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("json parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
