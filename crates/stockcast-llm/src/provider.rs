//! LLM provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// Trait for LLM providers
///
/// Implementations wrap a hosted text-generation service. A provider is
/// stateless between calls: no retries, no streaming.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion for the request
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the provider name (e.g., "gemini")
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Message, Role, StopReason, TokenUsage};

    #[tokio::test]
    async fn test_mock_provider_as_trait_object() {
        let mut mock = MockLLMProvider::new();
        mock.expect_complete().times(1).returning(|request| {
            let prompt = request.messages[0].content.clone();
            Ok(CompletionResponse {
                message: Message::assistant(format!("echo: {prompt}")),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            })
        });
        mock.expect_name().return_const("mock".to_string());

        let provider: Box<dyn LLMProvider> = Box::new(mock);
        let request = CompletionRequest::builder("test-model")
            .add_message(Message::user("hi"))
            .build();

        let response = provider.complete(request).await.unwrap();
        assert_eq!(response.message.role, Role::Assistant);
        assert_eq!(response.text(), "echo: hi");
        assert_eq!(provider.name(), "mock");
    }
}
