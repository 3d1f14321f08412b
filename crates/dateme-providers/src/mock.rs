//! Mock provider for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use dateme_core::error::ProviderError;
use dateme_core::traits::{ChatProvider, ChatRequest, ChatResponse, ModelInfo, TokenUsage};

/// A mock chat provider for exercising the session without real API calls.
///
/// Replies are taken from a script in order; once it runs out the default
/// reply is used. A failing mock returns a network error on every call.
pub struct MockProvider {
    script: Mutex<VecDeque<String>>,
    default_reply: String,
    fail: bool,
    call_count: AtomicU32,
    last_request: Mutex<Option<ChatRequest>>,
}

impl MockProvider {
    /// Replies with `scripted` in order, then with `"mock reply"`.
    pub fn new(scripted: Vec<String>) -> Self {
        Self {
            script: Mutex::new(scripted.into()),
            default_reply: "mock reply".to_string(),
            fail: false,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same reply.
    pub fn with_fixed_response(reply: &str) -> Self {
        Self {
            default_reply: reply.to_string(),
            ..Self::new(Vec::new())
        }
    }

    /// Create a mock whose every call fails as if the network were down.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this provider.
    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &ChatRequest) -> anyhow::Result<ChatResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());

        if self.fail {
            return Err(ProviderError::NetworkError("connection refused".into()).into());
        }

        let content = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone());

        let prompt_tokens = (request.system_prompt.len() / 4) as u32; // Rough estimate
        let completion_tokens = (content.len() / 4) as u32;

        Ok(ChatResponse {
            content,
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
            latency_ms: 1,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".into(),
            name: "Mock Model".into(),
            provider: "mock".into(),
            max_context: 100_000,
            vision: true,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dateme_core::traits::{ChatMessage, Role};

    fn request(text: &str) -> ChatRequest {
        ChatRequest {
            model: "mock".into(),
            system_prompt: "be kind".into(),
            messages: vec![ChatMessage {
                role: Role::User,
                text: text.into(),
                image: None,
            }],
            max_tokens: 100,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn fixed_response() {
        let provider = MockProvider::with_fixed_response("You've got this.");
        let response = provider.complete(&request("anything")).await.unwrap();
        assert_eq!(response.content, "You've got this.");
        assert_eq!(provider.call_count(), 1);
        assert_eq!(
            provider.last_request().unwrap().messages[0].text,
            "anything"
        );
    }

    #[tokio::test]
    async fn scripted_then_default() {
        let provider = MockProvider::new(vec!["first".into(), "second".into()]);
        let req = request("hi");

        assert_eq!(provider.complete(&req).await.unwrap().content, "first");
        assert_eq!(provider.complete(&req).await.unwrap().content, "second");
        assert_eq!(provider.complete(&req).await.unwrap().content, "mock reply");
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn failing_mock_errors() {
        let provider = MockProvider::failing();
        let err = provider.complete(&request("hi")).await.unwrap_err();
        assert!(err.downcast_ref::<ProviderError>().is_some());
        assert_eq!(provider.call_count(), 1);
    }
}
