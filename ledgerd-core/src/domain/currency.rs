//! Currency code validation
//!
//! Accounts hold a single ISO 4217 currency fixed at creation. The set of
//! codes accepted here is the validator the services rely on; it is not an
//! FX layer - equality of codes is the only operation the core performs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};

/// Currency codes the backend accepts for new accounts.
const SUPPORTED_CODES: &[&str] = &[
    "AED", "AUD", "BRL", "CAD", "CHF", "CNY", "CZK", "DKK", "EUR", "GBP",
    "HKD", "HUF", "IDR", "ILS", "INR", "JPY", "KRW", "MXN", "NOK", "NZD",
    "PLN", "RON", "SAR", "SEK", "SGD", "THB", "TRY", "USD", "ZAR",
];

/// A validated ISO 4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Parse and validate a currency code. Input is trimmed and upcased
    /// before the lookup, so "try" and " TRY " both resolve to TRY.
    pub fn parse(code: &str) -> Result<Self> {
        let normalized = code.trim().to_uppercase();
        if SUPPORTED_CODES.binary_search(&normalized.as_str()).is_ok() {
            Ok(Self(normalized))
        } else {
            Err(Error::validation(format!("unsupported currency code: {code}")))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Currency {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Currency> for String {
    fn from(c: Currency) -> Self {
        c.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_table_is_sorted() {
        // binary_search above depends on this
        let mut sorted = SUPPORTED_CODES.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, SUPPORTED_CODES);
    }

    #[test]
    fn test_parse_normalizes() {
        assert_eq!(Currency::parse("try").unwrap().as_str(), "TRY");
        assert_eq!(Currency::parse(" eur ").unwrap().as_str(), "EUR");
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(Currency::parse("XXX").is_err());
        assert!(Currency::parse("").is_err());
        assert!(Currency::parse("EURO").is_err());
    }

    #[test]
    fn test_equality_drives_mismatch_gate() {
        let a = Currency::parse("TRY").unwrap();
        let b = Currency::parse("try").unwrap();
        let c = Currency::parse("USD").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
