// Topic knowledge base for the local responder
// Entries are checked in table order; the first topic contained in the message wins

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnowledgeEntry {
    pub topic: &'static str,
    pub explanation: &'static str,
}

pub const KNOWLEDGE_BASE: &[KnowledgeEntry] = &[
    // Programming topics
    KnowledgeEntry {
        topic: "javascript",
        explanation: "JavaScript is a versatile programming language primarily used for web development. It's essential for creating interactive websites and can also be used for server-side development with Node.js.",
    },
    KnowledgeEntry {
        topic: "react",
        explanation: "React is a popular JavaScript library for building user interfaces, especially single-page applications. It uses a component-based architecture and virtual DOM for efficient rendering.",
    },
    KnowledgeEntry {
        topic: "python",
        explanation: "Python is a high-level, interpreted programming language known for its simplicity and readability. It's widely used in web development, data science, AI, and automation.",
    },
    KnowledgeEntry {
        topic: "html",
        explanation: "HTML (HyperText Markup Language) is the standard markup language for creating web pages. It provides the basic structure and content of websites.",
    },
    KnowledgeEntry {
        topic: "css",
        explanation: "CSS (Cascading Style Sheets) is used for styling and laying out web pages. It controls the visual presentation of HTML elements.",
    },
    // General topics
    KnowledgeEntry {
        topic: "ai",
        explanation: "Artificial Intelligence (AI) refers to the simulation of human intelligence in machines. It includes machine learning, natural language processing, and computer vision.",
    },
    KnowledgeEntry {
        topic: "technology",
        explanation: "Technology encompasses the application of scientific knowledge for practical purposes, including computers, software, and digital systems that enhance human capabilities.",
    },
    KnowledgeEntry {
        topic: "science",
        explanation: "Science is a systematic approach to understanding the natural world through observation, experimentation, and analysis. It encompasses physics, chemistry, biology, and many other fields.",
    },
];

/// Find the first entry whose topic appears anywhere in the message (case-insensitive)
pub fn lookup_entry(message: &str) -> Option<&'static KnowledgeEntry> {
    let lower = message.to_lowercase();
    KNOWLEDGE_BASE.iter().find(|entry| lower.contains(entry.topic))
}

/// Explanation text for the first topic mentioned in the message
pub fn lookup(message: &str) -> Option<&'static str> {
    lookup_entry(message).map(|entry| entry.explanation)
}
