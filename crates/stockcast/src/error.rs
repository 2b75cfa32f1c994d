//! Error types for stock data, forecasting and summarization

use thiserror::Error;

/// Stock analysis specific errors
///
/// The first five variants are the outcomes a caller is expected to handle
/// by degrading its output; the rest are plumbing failures that get folded
/// into them at component boundaries.
#[derive(Debug, Error)]
pub enum StockError {
    /// Market data could not be retrieved for the symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Too few rows for a reliable forecast
    #[error("Insufficient history: {rows} rows, at least {required} required")]
    InsufficientHistory { rows: usize, required: usize },

    /// Regression could not be fitted
    #[error("Model fit failed: {0}")]
    ModelFit(String),

    /// No API key configured for the LLM provider
    #[error("Credential missing: {0}")]
    CredentialMissing(String),

    /// The LLM call failed
    #[error("Summarization failed: {0}")]
    Summarization(String),

    /// Unknown history period
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// History payload could not be turned into a price series
    #[error("Invalid history: {0}")]
    InvalidHistory(String),

    /// Technical indicator calculation error
    #[error("Indicator calculation error: {0}")]
    IndicatorError(String),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

impl StockError {
    /// Wrap any failure as "data unavailable" for `symbol`
    pub fn unavailable(symbol: impl Into<String>, reason: impl ToString) -> Self {
        Self::DataUnavailable {
            symbol: symbol.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<crate::analysis::ForecastError> for StockError {
    fn from(err: crate::analysis::ForecastError) -> Self {
        StockError::ModelFit(err.to_string())
    }
}

impl From<stockcast_llm::LLMError> for StockError {
    fn from(err: stockcast_llm::LLMError) -> Self {
        match err {
            stockcast_llm::LLMError::ConfigurationError(msg) => StockError::CredentialMissing(msg),
            other => StockError::Summarization(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StockError::InvalidPeriod("7w".to_string());
        assert_eq!(err.to_string(), "Invalid period: 7w");

        let err = StockError::unavailable("AAPL", "No data found");
        assert_eq!(err.to_string(), "Data not available for AAPL: No data found");

        let err = StockError::InsufficientHistory { rows: 5, required: 30 };
        assert_eq!(err.to_string(), "Insufficient history: 5 rows, at least 30 required");
    }

    #[test]
    fn test_llm_error_conversion() {
        let err: StockError =
            stockcast_llm::LLMError::ConfigurationError("no key".to_string()).into();
        assert!(matches!(err, StockError::CredentialMissing(_)));

        let err: StockError = stockcast_llm::LLMError::AuthenticationFailed.into();
        match err {
            StockError::Summarization(msg) => assert!(msg.contains("API key rejected")),
            other => panic!("Expected Summarization variant, got {other:?}"),
        }
    }
}
