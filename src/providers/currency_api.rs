use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::config::ProviderConfig;
use crate::core::{CurrencyCode, FetchError, RateSnapshot, RateTable, RateTableProvider};

/// Client for the `@fawazahmed0/currency-api` style endpoint, which serves
/// `{base_url}/{code}.json` as `{"date": "...", "<code>": {"<other>": rate}}`.
pub struct CurrencyApiProvider {
    base_url: String,
    client: reqwest::Client,
}

impl CurrencyApiProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("xrates/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(CurrencyApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        Self::new(&config.base_url, config.timeout())
    }

    fn url_for(&self, code: &CurrencyCode) -> String {
        format!("{}/{}.json", self.base_url, code)
    }
}

#[async_trait]
impl RateTableProvider for CurrencyApiProvider {
    #[instrument(skip(self))]
    async fn fetch_rates(&self, code: &CurrencyCode) -> Result<RateSnapshot, FetchError> {
        let url = self.url_for(code);
        debug!("Requesting rate table from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Network {
                code: code.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Http {
                code: code.to_string(),
                status: response.status(),
            });
        }

        let text = response.text().await.map_err(|source| FetchError::Network {
            code: code.to_string(),
            source,
        })?;

        parse_rate_response(code, &text)
    }
}

/// Extracts the sub-object keyed by `code` from a provider response body.
pub(crate) fn parse_rate_response(
    code: &CurrencyCode,
    body: &str,
) -> Result<RateSnapshot, FetchError> {
    let parse_error = |reason: String| FetchError::Parse {
        code: code.to_string(),
        reason,
    };

    let value: Value = serde_json::from_str(body).map_err(|e| parse_error(e.to_string()))?;
    let Value::Object(mut root) = value else {
        return Err(parse_error("response is not a JSON object".to_string()));
    };

    let entries = match root.remove(code.as_str()) {
        Some(Value::Object(entries)) => entries,
        Some(other) => {
            return Err(parse_error(format!(
                "expected an object of rates, found {}",
                json_type(&other)
            )));
        }
        None => {
            return Err(FetchError::MissingField {
                code: code.to_string(),
            });
        }
    };

    let date = root
        .get("date")
        .and_then(Value::as_str)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());

    Ok(RateSnapshot {
        base: code.clone(),
        date,
        rates: collect_rates(entries),
    })
}

fn collect_rates(entries: Map<String, Value>) -> RateTable {
    entries
        .into_iter()
        .filter_map(|(counter, value)| match value.as_f64() {
            Some(rate) => Some((counter, rate)),
            None => {
                debug!("Skipping non-numeric rate for {}: {}", counter, value);
                None
            }
        })
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
