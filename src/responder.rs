//! Local pattern responder
//!
//! The terminal stage of the resolver. Builds a reply from the personality's
//! templates, the knowledge base and keywords pulled out of the message. Pure
//! computation apart from the optional simulated latency, and it always
//! produces non-empty text.

use crate::classifier::{self, Intent};
use crate::knowledge;
use crate::logging;
use crate::personality::{self, pick, CodingNote, Personality, TemplateCategory};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use std::ops::RangeInclusive;
use std::time::Duration;

const KEYWORD_PLACEHOLDER: &str = "your topic";
const TOPIC_PLACEHOLDER: &str = "this concept";
const MAX_KEYWORDS: usize = 3;

const STOPWORDS: &[&str] = &[
    "this", "that", "with", "have", "will", "what", "how", "can", "could", "would", "should", "the",
    "and", "or", "but", "for", "from", "about",
];

const HELP_LINE: &str = "I'm here to assist you with any questions or tasks you might have!";

const CODING_TIPS: &[&str] = &[
    "Start by breaking down the problem into smaller, manageable pieces. Then tackle each piece systematically.",
    "Consider using modern development practices like clean code principles, proper error handling, and comprehensive testing.",
    "Think about user experience and performance optimization from the beginning of your development process.",
    "Don't forget to document your code and consider how other developers might interact with your solution.",
];

const CREATIVE_PROMPTS: &[&str] = &[
    "Let your imagination soar! Picture a world where colors have emotions and dreams take physical form.",
    "Creativity flows like a river of possibilities. What if we combined unexpected elements to create something entirely new?",
    "In the realm of creation, there are no limits. Let's blend art, technology, and pure imagination!",
    "Every creative journey starts with a single spark. Let's fan that flame into something magnificent!",
];

/// Simulated thinking time, in milliseconds
pub const SIMULATED_LATENCY_MS: RangeInclusive<u64> = 800..=2000;

static MAIN_TOPIC_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"(?i)what\s+(?:is|are)\s+([^?]+)").expect("what-is topic pattern"),
        Regex::new(r"(?i)explain\s+([^?]+)").expect("explain topic pattern"),
    ]
});

/// Up to three stopword-filtered words longer than three characters, comma-joined
pub fn extract_keywords(message: &str) -> String {
    let keywords: Vec<String> = message
        .split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|word| word.chars().count() > 3 && !STOPWORDS.contains(&word.as_str()))
        .take(MAX_KEYWORDS)
        .collect();

    if keywords.is_empty() {
        KEYWORD_PLACEHOLDER.to_string()
    } else {
        keywords.join(", ")
    }
}

/// The subject of a "what is ..." or "explain ..." message, keeping the user's casing
pub fn extract_main_topic(message: &str) -> String {
    MAIN_TOPIC_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(message))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().trim_end_matches(['.', '!']).trim().to_string())
        .filter(|topic| !topic.is_empty())
        .unwrap_or_else(|| TOPIC_PLACEHOLDER.to_string())
}

fn coding_sentence<R: Rng + ?Sized>(personality: &Personality, rng: &mut R) -> String {
    let tip = pick(CODING_TIPS, rng).unwrap_or(CODING_TIPS[0]);
    match personality.coding_note {
        CodingNote::Tip => tip.to_string(),
        CodingNote::LeadIn(lead) => format!("{} {}", lead, tip),
        CodingNote::Fixed(sentence) => sentence.to_string(),
    }
}

/// Second sentence built around what the user actually asked about
fn synthesized_sentence<R: Rng + ?Sized>(intent: Intent, message: &str, rng: &mut R) -> Option<String> {
    let keywords = extract_keywords(message);
    let sentence = match intent {
        Intent::Coding => match rng.random_range(0..3) {
            0 => format!("For {}, break the work into small steps: settle the data structures first, then implement the core logic piece by piece.", keywords),
            1 => format!("Questions about {} usually come down to a clean, modular approach. Define the requirements, pick the right tools and test as you go.", keywords),
            _ => format!("With {}, understanding the underlying concepts makes it much easier to apply the right patterns.", keywords),
        },
        Intent::HowTo => match rng.random_range(0..3) {
            0 => format!("When it comes to {}, start with the fundamentals and practice with simple examples before adding complexity.", keywords),
            1 => format!("Getting there with {} is very achievable. Set a clear goal, learn the common practices and experiment freely.", keywords),
            _ => format!("For {}, understanding the 'why' behind each step matters as much as the 'how'.", keywords),
        },
        Intent::WhatIs => {
            let topic = extract_main_topic(message);
            match rng.random_range(0..3) {
                0 => format!("{} is a fascinating topic! Around {}, the key aspects are its core purpose, how it relates to similar ideas and when you'd reach for it.", topic, keywords),
                1 => format!("{} can seem confusing at first, but it is quite logical once the fundamentals around {} click.", topic, keywords),
                _ => format!("Think of {} as a tool that evolved to solve real problems around {} more efficiently than what came before.", topic, keywords),
            }
        }
        Intent::Question => match rng.random_range(0..3) {
            0 => format!("On {}, it helps to look at the context, the different perspectives and the practical implications.", keywords),
            1 => format!("Your question about {} touches on several ideas worth exploring.", keywords),
            _ => format!("There are several ways to approach {}, depending on what you're trying to achieve.", keywords),
        },
        Intent::Creative => match rng.random_range(0..3) {
            0 => format!("For {}, think about what makes the idea unique and let that guide you.", keywords),
            1 => format!("{} has so much potential once you let the unexpected connections show up.", keywords),
            _ => format!("With {}, start from the feeling you want to create and build outward from there.", keywords),
        },
        Intent::Greeting | Intent::Help | Intent::Default => return None,
    };
    Some(sentence)
}

/// Offline responder. Construct once and share; it holds no per-request state.
#[derive(Debug, Clone, Default)]
pub struct LocalResponder {
    simulated_latency: Option<RangeInclusive<u64>>,
}

impl LocalResponder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep a random 800-2000 ms before answering, like a remote model would
    pub fn with_simulated_latency(mut self) -> Self {
        self.simulated_latency = Some(SIMULATED_LATENCY_MS);
        self
    }

    pub fn simulates_latency(&self) -> bool {
        self.simulated_latency.is_some()
    }

    /// Generate a decorated reply. Unknown personality ids use `helpful`.
    pub fn generate<R: Rng + ?Sized>(&self, message: &str, personality_id: &str, rng: &mut R) -> String {
        let personality = personality::get_or_default(personality_id);
        let composed = compose(message, personality, rng);
        personality.decorate(&composed, rng)
    }

    /// [`generate`](Self::generate) after the optional simulated delay
    pub async fn respond<R: Rng + Send + ?Sized>(&self, message: &str, personality_id: &str, rng: &mut R) -> String {
        if let Some(range) = &self.simulated_latency {
            let delay = Duration::from_millis(rng.random_range(range.clone()));
            tokio::time::sleep(delay).await;
        }
        self.generate(message, personality_id, rng)
    }
}

/// Undecorated reply for an already-resolved personality
pub fn compose<R: Rng + ?Sized>(message: &str, personality: &Personality, rng: &mut R) -> String {
    let classification = classifier::classify(message, personality.id);
    let intent = classification.intent;

    logging::log_responder(&format!(
        "intent={} personality={} message=\"{}\"",
        intent.as_str(),
        personality.id,
        logging::preview(message)
    ));

    let mut parts: Vec<String> = vec![personality.pick_template(intent.template_category(), rng).to_string()];

    let explanation = classification.knowledge.map(|entry| entry.explanation).or_else(|| match intent {
        Intent::Coding => knowledge::lookup(message),
        _ => None,
    });

    match intent {
        Intent::Greeting => {}
        Intent::Coding => {
            parts.extend(explanation.map(str::to_string));
            parts.push(coding_sentence(personality, rng));
            parts.extend(synthesized_sentence(intent, message, rng));
        }
        Intent::Creative => {
            parts.push(pick(CREATIVE_PROMPTS, rng).unwrap_or(CREATIVE_PROMPTS[0]).to_string());
            parts.extend(synthesized_sentence(intent, message, rng));
        }
        Intent::Help => parts.push(HELP_LINE.to_string()),
        Intent::HowTo | Intent::WhatIs => {
            parts.extend(explanation.map(str::to_string));
            parts.extend(synthesized_sentence(intent, message, rng));
        }
        Intent::Question => {
            parts.extend(explanation.map(str::to_string));
            parts.extend(synthesized_sentence(intent, message, rng));
            parts.push(personality.pick_closing(rng).to_string());
        }
        Intent::Default => parts.push(personality.pick_closing(rng).to_string()),
    }

    let composed = parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if composed.is_empty() {
        personality.templates_for(TemplateCategory::Default)[0].to_string()
    } else {
        composed
    }
}
