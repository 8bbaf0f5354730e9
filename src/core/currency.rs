//! Currency and rate table abstractions

use crate::core::error::FetchError;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt::Display;
use std::str::FromStr;

/// Identifier naming a currency, e.g. `usd`.
///
/// Codes are case-insensitive by provider convention, so they are stored
/// trimmed and lowercased. Nothing else is checked: an empty or unknown code
/// is sent to the provider as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: &str) -> Self {
        CurrencyCode(code.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(CurrencyCode::new(s))
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CurrencyCode {
    fn from(code: &str) -> Self {
        CurrencyCode::new(code)
    }
}

impl From<String> for CurrencyCode {
    fn from(code: String) -> Self {
        CurrencyCode::new(&code)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

/// Counter currency -> rate, where a rate of `N` means one unit of the base
/// currency buys `N` units of the counter currency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateTable(HashMap<String, f64>);

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a rate by counter currency. Keys are kept as the provider
    /// sent them, so an exact match wins and case is ignored otherwise.
    pub fn get(&self, code: &str) -> Option<f64> {
        let code = code.trim();
        self.0.get(code).copied().or_else(|| {
            self.0
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(code))
                .map(|(_, rate)| *rate)
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.0.iter()
    }

    /// Entries ordered by counter currency code.
    pub fn sorted(&self) -> Vec<(&str, f64)> {
        let mut entries: Vec<_> = self.0.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl From<HashMap<String, f64>> for RateTable {
    fn from(rates: HashMap<String, f64>) -> Self {
        RateTable(rates)
    }
}

impl FromIterator<(String, f64)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        RateTable(iter.into_iter().collect())
    }
}

/// One successful fetch for a base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub base: CurrencyCode,
    /// Publication date reported by the provider, if any.
    pub date: Option<NaiveDate>,
    pub rates: RateTable,
}

#[async_trait]
pub trait RateTableProvider: Send + Sync {
    async fn fetch_rates(&self, code: &CurrencyCode) -> Result<RateSnapshot, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_code_is_normalized() {
        assert_eq!(CurrencyCode::new(" USD ").as_str(), "usd");
        assert_eq!(CurrencyCode::from("Eur"), CurrencyCode::new("eur"));
        assert_eq!("GBP".parse::<CurrencyCode>().unwrap().to_string(), "gbp");
    }

    #[test]
    fn test_empty_code_passes_through() {
        assert_eq!(CurrencyCode::new("").as_str(), "");
    }

    #[test]
    fn test_currency_code_serde() {
        let code: CurrencyCode = serde_json::from_str(r#""JPY""#).unwrap();
        assert_eq!(code.as_str(), "jpy");
        assert_eq!(serde_json::to_string(&code).unwrap(), r#""jpy""#);
    }

    #[test]
    fn test_rate_table_lookup() {
        let table: RateTable = [("eur".to_string(), 0.92), ("jpy".to_string(), 149.5)]
            .into_iter()
            .collect();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("eur"), Some(0.92));
        assert_eq!(table.get("JPY"), Some(149.5));
        assert_eq!(table.get("gbp"), None);
        assert_eq!(table.sorted(), vec![("eur", 0.92), ("jpy", 149.5)]);
    }

    #[test]
    fn test_rate_table_keeps_provider_key_case() {
        let table: RateTable = [("EUR".to_string(), 0.92), ("Jpy".to_string(), 149.5)]
            .into_iter()
            .collect();

        assert_eq!(table.get("EUR"), Some(0.92));
        assert_eq!(table.get("eur"), Some(0.92));
        assert_eq!(table.get("JPY"), Some(149.5));
        assert_eq!(table.sorted(), vec![("EUR", 0.92), ("Jpy", 149.5)]);
    }

    #[test]
    fn test_default_rate_table_is_empty() {
        let table = RateTable::default();
        assert!(table.is_empty());
        assert!(table.sorted().is_empty());
    }
}
