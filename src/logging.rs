//! Structured logging module for Chatmate
//!
//! Every event carries a `category` field:
//! - PROVIDER: Remote adapter attempts and their failure class
//! - ROUTING: Resolver stage transitions and the winning stage
//! - RESPONDER: Local intent and template decisions
//! - CONVERSATION: Session lifecycle
//! - ERROR: Errors that were recovered from

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

/// Log categories for structured logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    Provider,     // Remote adapter attempts
    Routing,      // Resolver stage transitions
    Responder,    // Local pattern responder
    Conversation, // Session lifecycle (create, send, export)
    Error,        // Recovered errors
}

impl LogCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogCategory::Provider => "PROVIDER",
            LogCategory::Routing => "ROUTING",
            LogCategory::Responder => "RESPONDER",
            LogCategory::Conversation => "CONVERSATION",
            LogCategory::Error => "ERROR",
        }
    }
}

static INIT: OnceCell<()> = OnceCell::new();

/// Initialize the logging system. Filter comes from `RUST_LOG`, defaulting to `info`.
/// Safe to call more than once.
pub fn init_logging() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        // Another subscriber may already be installed by an embedding application
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    });
}

/// Shorten user text for log lines
pub fn preview(text: &str) -> String {
    const MAX_CHARS: usize = 50;
    if text.chars().count() <= MAX_CHARS {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX_CHARS).collect();
        format!("{}...", head)
    }
}

/// First eight characters of an id, cut on a char boundary
fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(end, _)| &id[..end])
}

/// Log a message with category and optional conversation context
pub fn log(category: LogCategory, conversation_id: Option<&str>, message: &str) {
    let conversation = conversation_id
        .map(short_id)
        .unwrap_or("-");

    match category {
        LogCategory::Error => tracing::warn!(category = category.as_str(), conversation, "{}", message),
        LogCategory::Responder => tracing::debug!(category = category.as_str(), conversation, "{}", message),
        _ => tracing::info!(category = category.as_str(), conversation, "{}", message),
    }
}

/// Log a provider attempt or failure
pub fn log_provider(message: &str) {
    log(LogCategory::Provider, None, message);
}

/// Log a routing decision (which stage, why)
pub fn log_routing(message: &str) {
    log(LogCategory::Routing, None, message);
}

/// Log a local responder decision
pub fn log_responder(message: &str) {
    log(LogCategory::Responder, None, message);
}

/// Log a conversation lifecycle event
pub fn log_conversation(conversation_id: Option<&str>, message: &str) {
    log(LogCategory::Conversation, conversation_id, message);
}

/// Log a recovered error
pub fn log_error(conversation_id: Option<&str>, message: &str) {
    log(LogCategory::Error, conversation_id, message);
}
