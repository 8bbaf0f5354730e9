use thiserror::Error;

/// Reasons a single rate table fetch can fail.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request error for currency {code}: {source}")]
    Network {
        code: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP error: {status} for currency {code}")]
    Http {
        code: String,
        status: reqwest::StatusCode,
    },
    #[error("Failed to parse JSON response for {code}: {reason}")]
    Parse { code: String, reason: String },
    #[error("No rate data found for currency: {code}")]
    MissingField { code: String },
}

impl FetchError {
    /// The currency code the failed request was made for.
    pub fn code(&self) -> &str {
        match self {
            FetchError::Network { code, .. }
            | FetchError::Http { code, .. }
            | FetchError::Parse { code, .. }
            | FetchError::MissingField { code } => code,
        }
    }
}
