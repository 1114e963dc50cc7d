//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "app": { "transferFee": "1", "feeCollectorIban": "TR..." }
//! }
//! ```
//! Environment variables override the file (for CI and one-off runs):
//! `LEDGERD_TRANSFER_FEE`, `LEDGERD_FEE_COLLECTOR_IBAN`.

use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    /// Flat fee charged on cross-user transfers, as a decimal string.
    #[serde(default)]
    transfer_fee: Option<String>,
    /// IBAN of the account collected fees are credited to. When absent,
    /// fee entries stay self-referential and the value leaves circulation.
    #[serde(default)]
    fee_collector_iban: Option<String>,
}

/// Ledgerd configuration (resolved view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub transfer_fee: Decimal,
    pub fee_collector_iban: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transfer_fee: Decimal::ONE,
            fee_collector_iban: None,
        }
    }
}

impl Config {
    /// Load config from the data directory, applying env overrides.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let settings_path = data_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let fee_source = std::env::var("LEDGERD_TRANSFER_FEE")
            .ok()
            .or(raw.app.transfer_fee);
        let transfer_fee = match fee_source {
            Some(s) => parse_fee(&s)?,
            None => Decimal::ONE,
        };

        let fee_collector_iban = std::env::var("LEDGERD_FEE_COLLECTOR_IBAN")
            .ok()
            .or(raw.app.fee_collector_iban)
            .filter(|s| !s.trim().is_empty());

        Ok(Self {
            transfer_fee,
            fee_collector_iban,
        })
    }
}

fn parse_fee(s: &str) -> Result<Decimal> {
    let fee = Decimal::from_str(s.trim())
        .map_err(|e| Error::Config(format!("invalid transferFee {s:?}: {e}")))?;
    if fee < Decimal::ZERO {
        return Err(Error::Config(format!("transferFee must not be negative: {s}")));
    }
    Ok(fee)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.transfer_fee, Decimal::ONE);
        assert!(config.fee_collector_iban.is_none());
    }

    #[test]
    fn test_parse_fee() {
        assert_eq!(parse_fee("1").unwrap(), Decimal::ONE);
        assert_eq!(parse_fee("0.50").unwrap(), Decimal::new(50, 2));
        assert_eq!(parse_fee("0").unwrap(), Decimal::ZERO);
        assert!(parse_fee("-1").is_err());
        assert!(parse_fee("one").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"app":{"transferFee":"2.25","feeCollectorIban":"TR330006100519786457841326"}}"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.transfer_fee, Decimal::new(225, 2));
        assert_eq!(
            config.fee_collector_iban.as_deref(),
            Some("TR330006100519786457841326")
        );
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.transfer_fee, Decimal::ONE);
        assert!(config.fee_collector_iban.is_none());
    }
}
