//! Conversation model, the storage seam and a chat session built on the resolver
//!
//! Persistence lives outside this crate: callers inject a [`ConversationStore`].
//! [`MemoryStore`] keeps the same JSON blob the browser client kept under
//! `chatapp_conversations`, which is enough for tests and the CLI.

use crate::error::{ChatError, Result};
use crate::logging;
use crate::personality::{self, PersonalityId};
use crate::resolver::ResponseResolver;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use uuid::Uuid;

pub const STORAGE_KEY: &str = "chatapp_conversations";
const TITLE_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<PersonalityId>,
}

impl ChatMessage {
    fn new(content: &str, sender: Sender, personality: Option<PersonalityId>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.to_string(),
            sender,
            timestamp: Utc::now().to_rfc3339(),
            personality,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: String,
    pub updated_at: String,
    pub personality: PersonalityId,
}

/// Where conversations are kept between sessions
pub trait ConversationStore: Send + Sync {
    fn load(&self) -> Result<Vec<Conversation>>;
    fn save(&self, conversations: &[Conversation]) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// In-process store holding conversations as one serialized JSON blob
#[derive(Debug, Default)]
pub struct MemoryStore {
    blob: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an existing blob
    pub fn with_blob(blob: &str) -> Self {
        Self {
            blob: Mutex::new(Some(blob.to_string())),
        }
    }

    pub fn blob(&self) -> Option<String> {
        self.blob.lock().ok().and_then(|b| b.clone())
    }
}

impl ConversationStore for MemoryStore {
    fn load(&self) -> Result<Vec<Conversation>> {
        let blob = self.blob.lock().map_err(|e| ChatError::Store(e.to_string()))?;
        match blob.as_deref() {
            Some(json) => Ok(serde_json::from_str(json)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, conversations: &[Conversation]) -> Result<()> {
        let json = serde_json::to_string(conversations)?;
        let mut blob = self.blob.lock().map_err(|e| ChatError::Store(e.to_string()))?;
        *blob = Some(json);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut blob = self.blob.lock().map_err(|e| ChatError::Store(e.to_string()))?;
        *blob = None;
        Ok(())
    }
}

fn title_from(content: &str) -> String {
    let head: String = content.chars().take(TITLE_CHARS).collect();
    format!("{}...", head)
}

fn display_time(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.with_timezone(&Utc).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

/// A user's set of conversations, newest first, with one active conversation
pub struct ChatSession<'r, S: ConversationStore> {
    resolver: &'r ResponseResolver,
    store: S,
    conversations: Vec<Conversation>,
    active_id: Option<String>,
    personality: PersonalityId,
}

impl<'r, S: ConversationStore> ChatSession<'r, S> {
    /// Load saved conversations; the most recent becomes active. A corrupt blob
    /// starts an empty session instead of failing.
    pub fn open(resolver: &'r ResponseResolver, store: S) -> Self {
        let conversations = match store.load() {
            Ok(conversations) => conversations,
            Err(e) => {
                logging::log_error(None, &format!("Error loading conversations: {}", e));
                Vec::new()
            }
        };
        let active_id = conversations.first().map(|c| c.id.clone());

        logging::log_conversation(None, &format!("Session opened with {} conversations", conversations.len()));

        Self {
            resolver,
            store,
            conversations,
            active_id,
            personality: PersonalityId::default(),
        }
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn personality(&self) -> PersonalityId {
        self.personality
    }

    /// Switch personality for new messages; unknown ids fall back to `helpful`
    pub fn set_personality(&mut self, id: &str) {
        self.personality = personality::get_or_default(id).id;
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        let id = self.active_id.as_deref()?;
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn set_active(&mut self, id: &str) -> Result<()> {
        if self.conversations.iter().any(|c| c.id == id) {
            self.active_id = Some(id.to_string());
            Ok(())
        } else {
            Err(ChatError::ConversationNotFound(id.to_string()))
        }
    }

    pub fn create_conversation(&mut self, title: Option<&str>) -> Result<&Conversation> {
        let now = Utc::now().to_rfc3339();
        let conversation = Conversation {
            id: Uuid::new_v4().to_string(),
            title: title
                .map(str::to_string)
                .unwrap_or_else(|| format!("Chat {}", self.conversations.len() + 1)),
            messages: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
            personality: self.personality,
        };

        logging::log_conversation(Some(&conversation.id), &format!("Created \"{}\"", conversation.title));

        self.active_id = Some(conversation.id.clone());
        self.conversations.insert(0, conversation);
        self.persist()?;
        Ok(&self.conversations[0])
    }

    pub fn delete_conversation(&mut self, id: &str) -> Result<()> {
        let before = self.conversations.len();
        self.conversations.retain(|c| c.id != id);
        if self.conversations.len() == before {
            return Err(ChatError::ConversationNotFound(id.to_string()));
        }

        if self.active_id.as_deref() == Some(id) {
            self.active_id = self.conversations.first().map(|c| c.id.clone());
        }

        logging::log_conversation(Some(id), "Deleted");
        self.persist()
    }

    /// Record the user's message, resolve a reply and record it. Starts a new
    /// conversation when none is active. Returns the reply message.
    pub async fn send_message(&mut self, content: &str) -> Result<ChatMessage> {
        if self.active_conversation().is_none() {
            self.create_conversation(None)?;
        }
        let active_id = self
            .active_id
            .clone()
            .ok_or_else(|| ChatError::Store("no active conversation".to_string()))?;

        let personality = self.personality;
        let first_exchange = {
            let conversation = self.conversation_mut(&active_id)?;
            let first = conversation.messages.is_empty();
            conversation.messages.push(ChatMessage::new(content, Sender::User, None));
            conversation.updated_at = Utc::now().to_rfc3339();
            first
        };

        let resolved = self.resolver.resolve(content, personality.as_str()).await;
        logging::log_conversation(
            Some(&active_id),
            &format!("Reply from {} ({} chars)", resolved.provenance, resolved.text.len()),
        );

        let reply = ChatMessage::new(&resolved.text, Sender::Ai, Some(personality));
        {
            let conversation = self.conversation_mut(&active_id)?;
            conversation.messages.push(reply.clone());
            conversation.updated_at = Utc::now().to_rfc3339();
            if first_exchange {
                conversation.title = title_from(content);
            }
        }

        self.persist()?;
        Ok(reply)
    }

    /// Messages in the active conversation containing `query` (case-insensitive)
    pub fn search_messages(&self, query: &str) -> Vec<&ChatMessage> {
        let needle = query.to_lowercase();
        self.active_conversation()
            .map(|c| {
                c.messages
                    .iter()
                    .filter(|m| m.content.to_lowercase().contains(&needle))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Plain-text transcript of a conversation
    pub fn export_conversation(&self, id: &str) -> Result<String> {
        let conversation = self
            .conversations
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| ChatError::ConversationNotFound(id.to_string()))?;

        let mut content = format!("Conversation: {}\n", conversation.title);
        content.push_str(&format!("Created: {}\n", display_time(&conversation.created_at)));
        content.push_str(&format!(
            "AI Personality: {}\n\n",
            personality::by_id(conversation.personality).name
        ));

        for message in &conversation.messages {
            let sender = match message.sender {
                Sender::User => "You",
                Sender::Ai => "AI Assistant",
            };
            content.push_str(&format!(
                "[{}] {}: {}\n\n",
                display_time(&message.timestamp),
                sender,
                message.content
            ));
        }

        Ok(content)
    }

    pub fn clear_all(&mut self) -> Result<()> {
        self.conversations.clear();
        self.active_id = None;
        logging::log_conversation(None, "Cleared all conversations");
        self.store.clear()
    }

    fn conversation_mut(&mut self, id: &str) -> Result<&mut Conversation> {
        self.conversations
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ChatError::ConversationNotFound(id.to_string()))
    }

    fn persist(&self) -> Result<()> {
        self.store.save(&self.conversations)
    }
}
