use crate::logging;
use crate::openai::http_client;
use crate::provider::{Credential, Provider, ProviderResult, Unavailable};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

pub const HUGGING_FACE_API_BASE: &str = "https://api-inference.huggingface.co/models";

/// Models tried in order within a single attempt
pub const DEFAULT_MODELS: &[&str] = &["microsoft/DialoGPT-large", "facebook/blenderbot-400M-distill"];

/// Shorter generations are treated as noise
const MIN_RESPONSE_CHARS: usize = 10;

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
    temperature: f32,
    do_sample: bool,
    return_full_text: bool,
}

/// Pull generated text out of the shapes the inference API returns:
/// `[{"generated_text": ...}]`, `[{"response": ...}]` or `{"generated_text": ...}`
fn extract_generated_text(payload: &Value) -> Option<String> {
    let item = match payload {
        Value::Array(items) => items.first()?,
        other => other,
    };
    item.get("generated_text")
        .or_else(|| item.get("response"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Drop the user's message if the model echoed it back
fn strip_echo(text: &str, message: &str) -> String {
    if message.is_empty() {
        return text.trim().to_string();
    }
    text.replacen(message, "", 1).trim().to_string()
}

pub struct HuggingFaceProvider {
    client: Client,
    base_url: String,
    models: Vec<String>,
    api_key: Option<Credential>,
}

impl HuggingFaceProvider {
    pub fn new(api_key: Option<Credential>) -> Self {
        Self {
            client: http_client(),
            base_url: HUGGING_FACE_API_BASE.to_string(),
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            api_key,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_models(mut self, models: &[&str]) -> Self {
        self.models = models.iter().map(|m| m.to_string()).collect();
        self
    }

    async fn query_model(&self, api_key: &Credential, model: &str, message: &str) -> ProviderResult {
        let request = InferenceRequest {
            inputs: message,
            parameters: InferenceParameters {
                max_new_tokens: 100,
                temperature: 0.7,
                do_sample: true,
                return_full_text: false,
            },
        };

        let response = self.client
            .post(format!("{}/{}", self.base_url, model))
            .header("Authorization", format!("Bearer {}", api_key.expose()))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Unavailable::Status(response.status().as_u16()));
        }

        let payload: Value = response.json().await?;
        let text = extract_generated_text(&payload).ok_or(Unavailable::EmptyPayload)?;
        let cleaned = strip_echo(&text, message);

        if cleaned.chars().count() > MIN_RESPONSE_CHARS {
            Ok(cleaned)
        } else {
            Err(Unavailable::EmptyPayload)
        }
    }
}

#[async_trait]
impl Provider for HuggingFaceProvider {
    fn name(&self) -> &str {
        "huggingface"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn try_generate(&self, message: &str, _system_prompt: &str) -> ProviderResult {
        let Some(api_key) = &self.api_key else {
            return Err(Unavailable::MissingCredential);
        };

        let mut last_failure = Unavailable::EmptyPayload;
        for model in &self.models {
            match self.query_model(api_key, model, message).await {
                Ok(text) => return Ok(text),
                Err(reason) => {
                    logging::log_provider(&format!("huggingface model {} unavailable: {}", model, reason));
                    last_failure = reason;
                }
            }
        }
        Err(last_failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{serve_once, serve_sequence};
    use serde_json::json;

    fn key() -> Option<Credential> {
        Credential::from_value(Some("hf_token"), "YOUR_HUGGING_FACE_TOKEN")
    }

    #[test]
    fn test_extract_generated_text_shapes() {
        assert_eq!(
            extract_generated_text(&json!([{"generated_text": "a"}])),
            Some("a".to_string())
        );
        assert_eq!(
            extract_generated_text(&json!([{"response": "b"}])),
            Some("b".to_string())
        );
        assert_eq!(
            extract_generated_text(&json!({"generated_text": "c"})),
            Some("c".to_string())
        );
        assert_eq!(extract_generated_text(&json!([])), None);
        assert_eq!(extract_generated_text(&json!({"error": "loading"})), None);
    }

    #[test]
    fn test_strip_echo() {
        assert_eq!(strip_echo("hello there, how are you", "hello there,"), "how are you");
        assert_eq!(strip_echo("  untouched ", ""), "untouched");
    }

    #[tokio::test]
    async fn test_unconfigured() {
        let provider = HuggingFaceProvider::new(None);
        assert!(!provider.is_configured());
        assert_eq!(provider.try_generate("hi", "").await, Err(Unavailable::MissingCredential));
    }

    #[tokio::test]
    async fn test_falls_through_to_second_model() {
        let (base, requests) = serve_sequence(vec![
            (503, r#"{"error":"Model is loading"}"#.to_string()),
            (200, r#"[{"generated_text":"Tell me a joke. Why did the chicken cross the road?"}]"#.to_string()),
        ])
        .await;
        let provider = HuggingFaceProvider::new(key()).with_base_url(&base);

        let text = provider.try_generate("Tell me a joke.", "ignored").await.unwrap();
        assert_eq!(text, "Why did the chicken cross the road?");

        let requests = requests.await.unwrap();
        assert!(requests[0].starts_with("POST /microsoft/DialoGPT-large"));
        assert!(requests[1].starts_with("POST /facebook/blenderbot-400M-distill"));
        assert!(requests[1].contains(r#""return_full_text":false"#));
    }

    #[tokio::test]
    async fn test_short_generation_is_rejected() {
        let base = serve_once(200, r#"[{"generated_text":"ok"}]"#).await;
        let provider = HuggingFaceProvider::new(key())
            .with_base_url(&base)
            .with_models(&["tiny/model"]);
        assert_eq!(provider.try_generate("hi", "").await, Err(Unavailable::EmptyPayload));
    }
}
