use async_trait::async_trait;
use std::fmt;

/// Why a provider produced no usable text. Never carries credentials or
/// response bodies, so it is safe to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    MissingCredential,
    Transport(String),
    Timeout,
    Status(u16),
    EmptyPayload,
    Decode,
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::MissingCredential => write!(f, "credential not configured"),
            Unavailable::Transport(kind) => write!(f, "transport failure ({})", kind),
            Unavailable::Timeout => write!(f, "timed out"),
            Unavailable::Status(code) => write!(f, "non-success status {}", code),
            Unavailable::EmptyPayload => write!(f, "empty or unusable payload"),
            Unavailable::Decode => write!(f, "unparsable payload"),
        }
    }
}

impl std::error::Error for Unavailable {}

impl From<reqwest::Error> for Unavailable {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors can embed the request URL; keep only the failure kind
        if e.is_timeout() {
            Unavailable::Timeout
        } else if e.is_decode() {
            Unavailable::Decode
        } else if let Some(status) = e.status() {
            Unavailable::Status(status.as_u16())
        } else if e.is_connect() {
            Unavailable::Transport("connect".to_string())
        } else if e.is_body() {
            Unavailable::Transport("body".to_string())
        } else {
            Unavailable::Transport("request".to_string())
        }
    }
}

/// Either a non-empty response or a definitive "not available"
pub type ProviderResult = Result<String, Unavailable>;

/// A remote text-generation service consulted before the local responder
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable name used for provenance and logs
    fn name(&self) -> &str;

    /// Whether the adapter has what it needs to attempt a call
    fn is_configured(&self) -> bool;

    /// One attempt, no retries
    async fn try_generate(&self, message: &str, system_prompt: &str) -> ProviderResult;
}

/// An API credential. Placeholder and blank values count as absent.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn from_value(value: Option<&str>, placeholder: &str) -> Option<Self> {
        let value = value?.trim();
        if value.is_empty() || value == placeholder {
            None
        } else {
            Some(Credential(value.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Treat whitespace-only text as no text
pub fn non_empty(text: Option<String>) -> ProviderResult {
    match text {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(Unavailable::EmptyPayload),
    }
}
