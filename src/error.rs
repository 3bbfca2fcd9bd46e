use thiserror::Error;

/// Errors surfaced by the crate's fallible seams.
///
/// The response pipeline itself never returns one of these to a caller:
/// unknown personalities are replaced by `helpful` and provider failures are
/// classified as [`crate::provider::Unavailable`] and skipped.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("unknown personality: {0}")]
    UnknownPersonality(String),

    #[error("conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("conversation store error: {0}")]
    Store(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ChatError>;
