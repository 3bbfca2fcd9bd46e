// Pattern classifier - maps a raw message to an intent using ordered regex tests

use crate::knowledge::{self, KnowledgeEntry};
use crate::personality::{PersonalityId, TemplateCategory};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Coding,
    HowTo,
    WhatIs,
    Creative,
    Help,
    Question,
    Default,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::Coding => "coding",
            Intent::HowTo => "how_to",
            Intent::WhatIs => "what_is",
            Intent::Creative => "creative",
            Intent::Help => "help",
            Intent::Question => "question",
            Intent::Default => "default",
        }
    }

    /// Which template list an intent opens with
    pub fn template_category(&self) -> TemplateCategory {
        match self {
            Intent::Greeting => TemplateCategory::Greetings,
            Intent::Coding => TemplateCategory::Coding,
            Intent::Creative => TemplateCategory::Creative,
            Intent::HowTo | Intent::WhatIs | Intent::Help | Intent::Question => TemplateCategory::Questions,
            Intent::Default => TemplateCategory::Default,
        }
    }
}

/// Result of classification. `knowledge` is set when the knowledge base decided the intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub intent: Intent,
    pub knowledge: Option<&'static KnowledgeEntry>,
}

impl Classification {
    fn of(intent: Intent) -> Self {
        Self { intent, knowledge: None }
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("classifier pattern"))
        .collect()
}

static GREETING_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"^(hi|hello|hey|good morning|good afternoon|good evening)\b",
        r"^(what's up|how are you|how's it going)",
    ])
});

static CODING_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(code|programming|javascript|python|react|css|html|function|algorithm|debug|error)",
        r"(how to code|write a function|create a|build a)",
    ])
});

static CREATIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(story|poem|creative|write|design|art|music|color|imagine)",
        r"(create something|be creative|make something)",
    ])
});

static HELP_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"(help|support|assistance|guide|tutorial|explain|teach)"]));

static QUESTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"^(what|how|why|when|where|who|which|can you|could you|do you|are you|will you)",
        r"\?$",
    ])
});

static HOW_TO_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^how (to|do|can)\b").expect("how-to pattern"));
static WHAT_IS_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^what (is|are)\b").expect("what-is pattern"));

fn any_match(patterns: &[Regex], message: &str) -> bool {
    patterns.iter().any(|p| p.is_match(message))
}

/// Trimmed, lower-cased form every pattern is tested against
pub fn normalize(message: &str) -> String {
    message.trim().to_lowercase()
}

/// Classify a message. Creative phrasing only counts for the `creative` personality;
/// for everyone else those words fall through to the later rules.
pub fn classify(message: &str, personality: PersonalityId) -> Classification {
    let message = normalize(message);

    if message.is_empty() {
        return Classification::of(Intent::Default);
    }

    if any_match(&GREETING_PATTERNS, &message) {
        return Classification::of(Intent::Greeting);
    }

    if any_match(&CODING_PATTERNS, &message) {
        return Classification::of(Intent::Coding);
    }

    if personality == PersonalityId::Creative && any_match(&CREATIVE_PATTERNS, &message) {
        return Classification::of(Intent::Creative);
    }

    if any_match(&HELP_PATTERNS, &message) {
        return Classification::of(Intent::Help);
    }

    if let Some(entry) = knowledge::lookup_entry(&message) {
        return Classification {
            intent: Intent::Question,
            knowledge: Some(entry),
        };
    }

    if any_match(&QUESTION_PATTERNS, &message) {
        let intent = if HOW_TO_PATTERN.is_match(&message) {
            Intent::HowTo
        } else if WHAT_IS_PATTERN.is_match(&message) {
            Intent::WhatIs
        } else {
            Intent::Question
        };
        return Classification::of(intent);
    }

    Classification::of(Intent::Default)
}

/// Intent only
pub fn classify_intent(message: &str, personality: PersonalityId) -> Intent {
    classify(message, personality).intent
}
