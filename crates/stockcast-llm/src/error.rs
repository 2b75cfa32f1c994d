//! Error types for LLM calls

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LLMError>;

#[derive(Error, Debug)]
pub enum LLMError {
    /// Non-success HTTP status without a more specific variant
    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("API key rejected by the provider")]
    AuthenticationFailed,

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Unknown model: {0}")]
    ModelNotFound(String),

    /// No text came back, usually because the prompt was blocked
    #[error("Empty response: {0}")]
    EmptyResponse(String),

    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[cfg(feature = "gemini")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Missing or malformed provider settings
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = LLMError::Api {
            status: 400,
            message: "contents is empty".to_string(),
        };
        assert_eq!(err.to_string(), "API returned 400: contents is empty");
    }
}
