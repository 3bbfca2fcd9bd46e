use crate::logging;
use crate::provider::{non_empty, Credential, Provider, ProviderResult, Unavailable};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

pub const OPENAI_DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const GROQ_DEFAULT_MODEL: &str = "mixtral-8x7b-32768";

const REQUEST_TIMEOUT_SECS: u64 = 30; // Outer bound; the resolver enforces its own per-attempt timeout
const MAX_TOKENS: u32 = 200;
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Serialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub(crate) fn http_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|e| {
            logging::log_error(None, &format!("HTTP client builder failed ({}), using defaults", e));
            Client::new()
        })
}

/// Any service speaking the OpenAI chat-completions protocol (OpenAI itself, Groq)
pub struct ChatCompletionsProvider {
    name: String,
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<Credential>,
}

impl ChatCompletionsProvider {
    pub fn new(name: &str, base_url: &str, model: &str, api_key: Option<Credential>) -> Self {
        Self {
            name: name.to_string(),
            client: http_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        }
    }

    pub fn openai(api_key: Option<Credential>, model: &str) -> Self {
        Self::new("openai", OPENAI_API_BASE, model, api_key)
    }

    pub fn groq(api_key: Option<Credential>, model: &str) -> Self {
        Self::new("groq", GROQ_API_BASE, model, api_key)
    }

    /// Point the adapter at another server
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    pub async fn chat_completion(
        &self,
        api_key: &Credential,
        messages: Vec<ChatMessage>,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> ProviderResult {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature,
            max_tokens: max_tokens.or(Some(MAX_TOKENS)),
        };

        let response = self.client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", api_key.expose()))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Unavailable::Status(response.status().as_u16()));
        }

        let completion: ChatCompletionResponse = response.json().await?;

        non_empty(
            completion.choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content),
        )
    }
}

#[async_trait]
impl Provider for ChatCompletionsProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn try_generate(&self, message: &str, system_prompt: &str) -> ProviderResult {
        let Some(api_key) = &self.api_key else {
            return Err(Unavailable::MissingCredential);
        };

        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: system_prompt.to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: message.to_string(),
            },
        ];

        self.chat_completion(api_key, messages, TEMPERATURE, Some(MAX_TOKENS)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{serve_once, serve_once_capture};

    fn key() -> Option<Credential> {
        Credential::from_value(Some("test-key"), "YOUR_OPENAI_API_KEY")
    }

    #[tokio::test]
    async fn test_missing_credential_skips_network() {
        let provider = ChatCompletionsProvider::groq(None, GROQ_DEFAULT_MODEL)
            .with_base_url("http://127.0.0.1:9");
        assert!(!provider.is_configured());
        assert_eq!(
            provider.try_generate("hi", "prompt").await,
            Err(Unavailable::MissingCredential)
        );
    }

    #[tokio::test]
    async fn test_successful_completion() {
        let (base, request) = serve_once_capture(
            200,
            r#"{"choices":[{"message":{"role":"assistant","content":"Hello from the model"}}]}"#,
        )
        .await;
        let provider = ChatCompletionsProvider::openai(key(), OPENAI_DEFAULT_MODEL).with_base_url(&base);

        let text = provider.try_generate("hi", "You are helpful.").await.unwrap();
        assert_eq!(text, "Hello from the model");

        let raw = request.await.unwrap();
        assert!(raw.starts_with("POST /chat/completions"));
        assert!(raw.to_lowercase().contains("authorization: bearer test-key"));
        assert!(raw.contains(r#""role":"system","content":"You are helpful.""#));
        assert!(raw.contains(r#""max_tokens":200"#));
    }

    #[tokio::test]
    async fn test_error_status_is_unavailable() {
        let base = serve_once(429, r#"{"error":{"message":"slow down"}}"#).await;
        let provider = ChatCompletionsProvider::groq(key(), GROQ_DEFAULT_MODEL).with_base_url(&base);
        assert_eq!(provider.try_generate("hi", "p").await, Err(Unavailable::Status(429)));
    }

    #[tokio::test]
    async fn test_empty_choices_is_unavailable() {
        let base = serve_once(200, r#"{"choices":[]}"#).await;
        let provider = ChatCompletionsProvider::openai(key(), OPENAI_DEFAULT_MODEL).with_base_url(&base);
        assert_eq!(provider.try_generate("hi", "p").await, Err(Unavailable::EmptyPayload));
    }

    #[tokio::test]
    async fn test_garbled_payload_is_unavailable() {
        let base = serve_once(200, "not json at all").await;
        let provider = ChatCompletionsProvider::openai(key(), OPENAI_DEFAULT_MODEL).with_base_url(&base);
        assert!(provider.try_generate("hi", "p").await.is_err());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport() {
        let provider = ChatCompletionsProvider::openai(key(), OPENAI_DEFAULT_MODEL)
            .with_base_url("http://127.0.0.1:9");
        assert!(matches!(
            provider.try_generate("hi", "p").await,
            Err(Unavailable::Transport(_))
        ));
    }
}
