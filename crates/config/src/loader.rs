use std::path::Path;

use crate::{ConfigError, PlatformConfig, Result};

/// Loads and validates platform configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from a file, dispatching on extension (TOML or JSON).
    pub fn from_file(path: &Path) -> Result<PlatformConfig> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::LoadError("no file extension found".to_string()))?;

        let content = std::fs::read_to_string(path)?;

        match extension {
            "toml" => Self::from_toml(&content),
            "json" => Self::from_json(&content),
            _ => Err(ConfigError::LoadError(format!(
                "unsupported file extension: {}",
                extension
            ))),
        }
    }

    pub fn from_toml(content: &str) -> Result<PlatformConfig> {
        let config: PlatformConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<PlatformConfig> {
        let config: PlatformConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_roundtrip() {
        let toml = r#"
            admin = "admin-1"
            vault = "vault-1"
            fee_bps = 50
        "#;
        let config = ConfigLoader::from_toml(toml).unwrap();
        assert_eq!(config.admin, "admin-1");
        assert_eq!(config.vault, "vault-1");
        assert_eq!(config.fee_bps, 50);
        // Unset fields fall back to defaults.
        assert_eq!(config.max_fee_bps, 1_000);
        assert_eq!(config.funding_window_secs, 86_400);
    }

    #[test]
    fn test_toml_invalid_fee_rejected_at_load() {
        let toml = r#"
            admin = "admin-1"
            vault = "vault-1"
            fee_bps = 5000
        "#;
        assert!(matches!(
            ConfigLoader::from_toml(toml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_toml_missing_admin_is_parse_error() {
        let toml = r#"vault = "vault-1""#;
        assert!(matches!(
            ConfigLoader::from_toml(toml),
            Err(ConfigError::TomlError(_))
        ));
    }

    #[test]
    fn test_json_load() {
        let json = r#"{"admin": "a", "vault": "v", "fee_bps": 10, "max_fee_bps": 100, "funding_window_secs": 3600}"#;
        let config = ConfigLoader::from_json(json).unwrap();
        assert_eq!(config.fee_bps, 10);
        assert_eq!(config.funding_window_secs, 3_600);
    }
}
