//! Natural-language stock summaries through an LLM provider

use crate::config::StockcastConfig;
use crate::error::{Result, StockError};
use crate::models::StockSnapshot;
use crate::prompts::{ANALYST_SYSTEM_PROMPT, summary_prompt};
use std::sync::Arc;
use stockcast_llm::providers::{GeminiConfig, GeminiProvider};
use stockcast_llm::{CompletionRequest, LLMProvider, Message};
use tracing::{debug, error, instrument, warn};

pub const MISSING_KEY_MESSAGE: &str =
    "Error: Gemini API key not configured. Please set GEMINI_API_KEY environment variable.";
pub const NO_STOCK_DATA_MESSAGE: &str = "Error: Could not retrieve stock data.";
pub const GENERATION_FAILED_MESSAGE: &str = "Error: Could not generate summary with Gemini.";

/// Summarizes stock snapshots with an LLM
///
/// Without a provider every request fails with
/// [`StockError::CredentialMissing`]; nothing is sent anywhere.
pub struct Summarizer {
    provider: Option<Arc<dyn LLMProvider>>,
    model: String,
    max_tokens: usize,
}

impl Summarizer {
    pub fn new(
        provider: Option<Arc<dyn LLMProvider>>,
        model: impl Into<String>,
        max_tokens: usize,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens,
        }
    }

    /// Gemini-backed summarizer, or an unconfigured one when no key is set
    pub fn from_config(config: &StockcastConfig) -> Result<Self> {
        let provider: Option<Arc<dyn LLMProvider>> = match config.api_key() {
            Some(key) => {
                let gemini = GeminiConfig::new(key).with_timeout(config.request_timeout.as_secs());
                let provider: Arc<dyn LLMProvider> = Arc::new(GeminiProvider::with_config(gemini)?);
                Some(provider)
            }
            None => {
                warn!("GEMINI_API_KEY not found; AI summaries are disabled");
                None
            }
        };
        Ok(Self::new(provider, &config.gemini_model, config.summary_max_tokens))
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Answer `query` about the stock described by `snapshot`
    #[instrument(skip(self, snapshot), fields(model = %self.model))]
    pub async fn summarize(&self, query: &str, snapshot: &StockSnapshot) -> Result<String> {
        let Some(provider) = &self.provider else {
            return Err(StockError::CredentialMissing(
                "no Gemini API key configured".to_string(),
            ));
        };

        let data = serde_json::to_string(snapshot)?;
        let request = CompletionRequest::builder(&self.model)
            .system(ANALYST_SYSTEM_PROMPT)
            .add_message(Message::user(summary_prompt(query, &data)))
            .max_tokens(self.max_tokens)
            .build();

        debug!("Requesting summary from {}", provider.name());
        let response = provider.complete(request).await.map_err(|e| {
            error!("Error during summarization with {}: {}", provider.name(), e);
            StockError::from(e)
        })?;

        debug!(
            "Summary used {} tokens ({:?})",
            response.usage.total(),
            response.stop_reason
        );
        let text = response.text().trim();
        if text.is_empty() {
            return Err(StockError::Summarization("empty response".to_string()));
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use mockall::mock;
    use stockcast_llm::{CompletionResponse, StopReason, TokenUsage};

    mock! {
        pub Llm {}

        #[async_trait]
        impl LLMProvider for Llm {
            async fn complete(&self, request: CompletionRequest) -> stockcast_llm::Result<CompletionResponse>;
            fn name(&self) -> &str;
        }
    }

    pub fn reply(text: &str) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }
}
