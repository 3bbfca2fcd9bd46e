// Personality registry - names, system prompts, local templates and voice decoration

use crate::error::ChatError;
use crate::logging;
use once_cell::sync::Lazy;
use rand::seq::IndexedRandom;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Share of `friendly` responses that get an emoji prefix
pub const FRIENDLY_PREFIX_PROBABILITY: f64 = 0.3;
/// Share of `creative` responses that get an emoji suffix
pub const CREATIVE_SUFFIX_PROBABILITY: f64 = 0.2;

const FRIENDLY_PREFIXES: &[&str] = &["😊 ", "👍 ", "✨ "];
const CREATIVE_SUFFIXES: &[&str] = &[" 🎨", " ✨", " 🌟"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonalityId {
    #[default]
    Helpful,
    Creative,
    Technical,
    Friendly,
}

impl PersonalityId {
    pub const ALL: [PersonalityId; 4] = [
        PersonalityId::Helpful,
        PersonalityId::Creative,
        PersonalityId::Technical,
        PersonalityId::Friendly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PersonalityId::Helpful => "helpful",
            PersonalityId::Creative => "creative",
            PersonalityId::Technical => "technical",
            PersonalityId::Friendly => "friendly",
        }
    }
}

impl fmt::Display for PersonalityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PersonalityId {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "helpful" => Ok(PersonalityId::Helpful),
            "creative" => Ok(PersonalityId::Creative),
            "technical" => Ok(PersonalityId::Technical),
            "friendly" => Ok(PersonalityId::Friendly),
            _ => Err(ChatError::UnknownPersonality(s.to_string())),
        }
    }
}

/// Template category a classified message draws its opening line from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateCategory {
    Greetings,
    Questions,
    Coding,
    Creative,
    Default,
}

/// How the coding intent's follow-up sentence is produced
#[derive(Debug, Clone, Copy)]
pub enum CodingNote {
    /// A random general tip
    Tip,
    /// A fixed lead-in followed by a random tip
    LeadIn(&'static str),
    /// Always the same sentence
    Fixed(&'static str),
}

#[derive(Debug)]
pub struct Templates {
    pub greetings: &'static [&'static str],
    pub questions: &'static [&'static str],
    pub coding: &'static [&'static str],
    pub creative: &'static [&'static str],
    pub default: &'static [&'static str],
}

#[derive(Debug)]
pub struct Personality {
    pub id: PersonalityId,
    pub name: &'static str,
    pub description: &'static str,
    pub avatar: &'static str,
    pub system_prompt: &'static str,
    pub templates: Templates,
    pub closings: &'static [&'static str],
    pub coding_note: CodingNote,
}

impl Personality {
    /// Candidate opening lines for a category; falls back to `default` when the
    /// personality has no dedicated list
    pub fn templates_for(&self, category: TemplateCategory) -> &'static [&'static str] {
        let list = match category {
            TemplateCategory::Greetings => self.templates.greetings,
            TemplateCategory::Questions => self.templates.questions,
            TemplateCategory::Coding => self.templates.coding,
            TemplateCategory::Creative => self.templates.creative,
            TemplateCategory::Default => self.templates.default,
        };
        if list.is_empty() {
            self.templates.default
        } else {
            list
        }
    }

    /// Uniformly random template for a category
    pub fn pick_template<R: Rng + ?Sized>(&self, category: TemplateCategory, rng: &mut R) -> &'static str {
        pick(self.templates_for(category), rng).unwrap_or(self.templates.default[0])
    }

    pub fn pick_closing<R: Rng + ?Sized>(&self, rng: &mut R) -> &'static str {
        pick(self.closings, rng).unwrap_or("")
    }

    /// Personality voice touches applied to every final response
    pub fn decorate<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> String {
        match self.id {
            PersonalityId::Friendly => {
                if rng.random::<f64>() < FRIENDLY_PREFIX_PROBABILITY {
                    if let Some(prefix) = pick(FRIENDLY_PREFIXES, rng) {
                        return format!("{}{}", prefix, text);
                    }
                }
                text.to_string()
            }
            PersonalityId::Creative => {
                if rng.random::<f64>() < CREATIVE_SUFFIX_PROBABILITY {
                    if let Some(suffix) = pick(CREATIVE_SUFFIXES, rng) {
                        return format!("{}{}", text, suffix);
                    }
                }
                text.to_string()
            }
            // Technical and helpful responses stay clean
            PersonalityId::Technical | PersonalityId::Helpful => text.to_string(),
        }
    }

    /// Clean a remote provider's text and apply decoration
    pub fn finish<R: Rng + ?Sized>(&self, raw: &str, rng: &mut R) -> String {
        self.decorate(&clean_response(raw), rng)
    }
}

pub(crate) fn pick<R: Rng + ?Sized>(items: &[&'static str], rng: &mut R) -> Option<&'static str> {
    items.choose(rng).copied()
}

static SPEAKER_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(AI:|Assistant:|Bot:)").expect("speaker label pattern"));

/// Trim and drop a leading speaker label a model may have echoed
pub fn clean_response(raw: &str) -> String {
    let trimmed = raw.trim();
    SPEAKER_LABEL.replace(trimmed, "").trim().to_string()
}

/// Look up a personality by id
pub fn get(id: &str) -> Result<&'static Personality, ChatError> {
    let id: PersonalityId = id.parse()?;
    Ok(by_id(id))
}

/// Look up a personality, substituting `helpful` for unknown ids
pub fn get_or_default(id: &str) -> &'static Personality {
    match get(id) {
        Ok(personality) => personality,
        Err(e) => {
            logging::log_error(None, &format!("{}; using helpful", e));
            by_id(PersonalityId::Helpful)
        }
    }
}

pub fn by_id(id: PersonalityId) -> &'static Personality {
    match id {
        PersonalityId::Helpful => &HELPFUL,
        PersonalityId::Creative => &CREATIVE,
        PersonalityId::Technical => &TECHNICAL,
        PersonalityId::Friendly => &FRIENDLY,
    }
}

pub fn all() -> impl Iterator<Item = &'static Personality> {
    PersonalityId::ALL.into_iter().map(by_id)
}

// ============ Registry ============

static HELPFUL: Personality = Personality {
    id: PersonalityId::Helpful,
    name: "Helpful Assistant",
    description: "Professional and informative",
    avatar: "🤖",
    system_prompt: "You are a helpful, professional AI assistant. Provide clear, accurate, and useful responses.",
    templates: Templates {
        greetings: &[
            "Hello! I'm here to help you with any questions or tasks you might have. What can I assist you with today?",
            "Hi there! I'm ready to help. What would you like to know or discuss?",
            "Hello! How can I be of assistance to you today?",
            "Hi! I'm your AI assistant. What can I help you with?",
        ],
        questions: &[
            "That's a great question! Let me provide you with a comprehensive answer.",
            "I'd be happy to help you understand this better.",
            "That's an interesting question. Here's what I can tell you:",
            "I can definitely help you with that. Let me explain:",
        ],
        coding: &[
            "I'd be happy to help you with programming! Here's what I suggest:",
            "Great coding question! Let me break this down for you:",
            "Programming is one of my favorite topics to discuss. Here's my take:",
            "I can definitely help you with this coding challenge:",
        ],
        creative: &[],
        default: &[
            "That's an interesting topic! Let me share some thoughts on this.",
            "I understand what you're asking about. Here's my perspective:",
            "Thanks for bringing this up. Here's what I think:",
            "That's worth exploring further. Let me elaborate:",
        ],
    },
    closings: &[
        "I hope this information is helpful! Is there anything specific you'd like me to elaborate on?",
        "Let me know if you need any clarification or have follow-up questions.",
        "I'm here to help with any additional questions or concerns you might have.",
    ],
    coding_note: CodingNote::Tip,
};

static FRIENDLY: Personality = Personality {
    id: PersonalityId::Friendly,
    name: "Friendly Buddy",
    description: "Casual and conversational",
    avatar: "😊",
    system_prompt: "You are a friendly, casual AI companion. Be warm, conversational, and engaging. Use a casual tone and show genuine interest in helping.",
    templates: Templates {
        greetings: &[
            "Hey there! 😊 Great to chat with you! What's on your mind?",
            "Hi friend! I'm so excited to talk with you today. What's up?",
            "Hello! 👋 I'm in a great mood and ready to help. How are you doing?",
            "Hey! Nice to meet you! What would you like to chat about?",
        ],
        questions: &[
            "Ooh, that's a really good question! 🤔 Let me think about this...",
            "I love questions like this! Here's what I'm thinking:",
            "That's such an interesting thing to ask about! 😄",
            "Great question, friend! I'm excited to share my thoughts:",
        ],
        coding: &[
            "Oh awesome, coding talk! 💻 I love this stuff! Here's what I'd do:",
            "Programming is so much fun! 🚀 Let me help you out:",
            "Code time! This is exciting! Here's my suggestion:",
            "Yay, a coding question! I'm all over this! 🎯",
        ],
        creative: &[],
        default: &[
            "That's so cool that you brought this up! 😊 I think:",
            "I'm really enjoying our conversation! Here's my take:",
            "This is fun to talk about! Let me share what I think:",
            "I love chatting about stuff like this! My thoughts:",
        ],
    },
    closings: &[
        "Hope this helps, friend! Feel free to ask me anything else that's on your mind! 😊",
        "Always happy to chat and help out! What else would you like to know?",
        "This is fun! I love having conversations like this. What's next?",
    ],
    coding_note: CodingNote::LeadIn("Let's tackle this together!"),
};

static CREATIVE: Personality = Personality {
    id: PersonalityId::Creative,
    name: "Creative Genius",
    description: "Imaginative and artistic",
    avatar: "🎨",
    system_prompt: "You are a creative AI assistant who thinks outside the box. Be imaginative, artistic, and inspire creativity in your responses.",
    templates: Templates {
        greetings: &[
            "Welcome to a world of infinite possibilities! ✨ What shall we create together?",
            "Greetings, creative soul! 🎨 I'm here to spark inspiration. What moves you?",
            "Hello, visionary! Ready to paint with words and ideas? What's your canvas today?",
            "Ah, a kindred creative spirit! 🌟 Let's explore the realms of imagination together!",
        ],
        questions: &[
            "What a delightfully curious question! Let me weave you an answer... ✨",
            "Questions are the seeds of creativity! Here's how I see it blooming:",
            "Like a kaleidoscope turning, your question reveals beautiful patterns:",
            "In the garden of knowledge, your question is a unique flower. Let me nurture it:",
        ],
        coding: &[
            "Ah, the art of code! Programming is poetry in logic. Here's my creative approach:",
            "Code is like painting with algorithms! 🎨 Let me sketch out a solution:",
            "In the symphony of software, every function is a note. Here's our melody:",
            "Programming is creative architecture for the digital realm! Let's build:",
        ],
        creative: &[
            "Now we're in my element! 🌈 Creativity flows like a river of starlight:",
            "Imagination is the only limit! Let's break boundaries together:",
            "Creative energy is buzzing! ⚡ Here's what springs to mind:",
            "Art and creativity are the heartbeat of innovation! Let's create magic:",
        ],
        default: &[
            "Every conversation is a blank canvas! 🎨 Let me paint you a response:",
            "Ideas dance in the realm of possibility. Here's what catches my eye:",
            "Through the prism of creativity, everything has beauty. I see this as:",
            "Like a story waiting to be told, your message inspires me to share:",
        ],
    },
    closings: &[
        "May this spark new ideas and creative possibilities in your mind! ✨",
        "Let inspiration guide your next steps on this creative journey!",
        "The canvas of possibility is vast - what masterpiece will you create?",
    ],
    coding_note: CodingNote::Fixed(
        "Code is like digital poetry! Let's craft an elegant solution that's both functional and beautiful.",
    ),
};

static TECHNICAL: Personality = Personality {
    id: PersonalityId::Technical,
    name: "Tech Expert",
    description: "Programming and technology focused",
    avatar: "💻",
    system_prompt: "You are a technical AI assistant specialized in programming, technology, and development. Provide detailed technical explanations and code examples when appropriate.",
    templates: Templates {
        greetings: &[
            "System initialized. Technical support and development assistance active. How may I assist?",
            "Hello. I'm optimized for technical queries, development challenges, and system analysis. What's your requirement?",
            "Technical assistant online. Ready to process programming, development, and technology-related requests.",
            "Greetings. My expertise spans software development, system architecture, and technical problem-solving. Please specify your query.",
        ],
        questions: &[
            "Processing your query. Here's a comprehensive technical analysis:",
            "Query received. Analyzing parameters and generating solution:",
            "Technical evaluation in progress. Here are the key considerations:",
            "Parsing your requirements. Here's a systematic breakdown:",
        ],
        coding: &[
            "Entering development mode. Here's a structured approach to your coding challenge:",
            "Code analysis initiated. Optimal solution pathway identified:",
            "Processing programming request. Here's the recommended implementation:",
            "Technical documentation generating. Code solution follows:",
        ],
        creative: &[],
        default: &[
            "Data processed. Here's a systematic analysis of your request:",
            "Information parsed successfully. Technical response generated:",
            "Query understood. Executing detailed analysis and response protocol:",
            "Processing complete. Here's the technical breakdown:",
        ],
    },
    closings: &[
        "Implementation details and further optimization strategies available upon request.",
        "For additional technical specifications or advanced configurations, please specify requirements.",
        "System analysis complete. Additional technical support available as needed.",
    ],
    coding_note: CodingNote::Fixed(
        "Here's a systematic approach: 1) Analyze requirements, 2) Design architecture, 3) Implement core functionality, 4) Test and optimize, 5) Deploy and monitor.",
    ),
};
