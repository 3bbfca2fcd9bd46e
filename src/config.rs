// Environment-driven configuration for the resolver and its adapters

use crate::error::{ChatError, Result};
use crate::openai::{GROQ_DEFAULT_MODEL, OPENAI_DEFAULT_MODEL};
use crate::provider::Credential;
use std::time::Duration;

pub const GROQ_KEY_VAR: &str = "GROQ_API_KEY";
pub const GROQ_MODEL_VAR: &str = "GROQ_MODEL";
pub const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";
pub const OPENAI_MODEL_VAR: &str = "OPENAI_MODEL";
pub const HUGGING_FACE_KEY_VAR: &str = "HUGGING_FACE_API_KEY";
pub const TIMEOUT_VAR: &str = "CHATMATE_PROVIDER_TIMEOUT_SECS";
pub const LATENCY_VAR: &str = "CHATMATE_SIMULATED_LATENCY";

pub const GROQ_PLACEHOLDER: &str = "YOUR_GROQ_API_KEY";
pub const OPENAI_PLACEHOLDER: &str = "YOUR_OPENAI_API_KEY";
pub const HUGGING_FACE_PLACEHOLDER: &str = "YOUR_HUGGING_FACE_TOKEN";

pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 8;

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub groq_key: Option<Credential>,
    pub groq_model: String,
    pub openai_key: Option<Credential>,
    pub openai_model: String,
    pub hugging_face_key: Option<Credential>,
    pub provider_timeout: Duration,
    pub simulated_latency: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            groq_key: None,
            groq_model: GROQ_DEFAULT_MODEL.to_string(),
            openai_key: None,
            openai_model: OPENAI_DEFAULT_MODEL.to_string(),
            hugging_face_key: None,
            provider_timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
            simulated_latency: false,
        }
    }
}

impl ResolverConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let model = |var: &str, default: String| {
            lookup(var)
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .unwrap_or(default)
        };

        let provider_timeout = match lookup(TIMEOUT_VAR) {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ChatError::Config(format!("{} must be a whole number of seconds, got {:?}", TIMEOUT_VAR, raw)))?;
                if secs == 0 {
                    return Err(ChatError::Config(format!("{} must be greater than zero", TIMEOUT_VAR)));
                }
                Duration::from_secs(secs)
            }
            None => defaults.provider_timeout,
        };

        let simulated_latency = match lookup(LATENCY_VAR) {
            Some(raw) => parse_flag(&raw)
                .ok_or_else(|| ChatError::Config(format!("{} must be true/false, got {:?}", LATENCY_VAR, raw)))?,
            None => false,
        };

        Ok(Self {
            groq_key: Credential::from_value(lookup(GROQ_KEY_VAR).as_deref(), GROQ_PLACEHOLDER),
            groq_model: model(GROQ_MODEL_VAR, defaults.groq_model),
            openai_key: Credential::from_value(lookup(OPENAI_KEY_VAR).as_deref(), OPENAI_PLACEHOLDER),
            openai_model: model(OPENAI_MODEL_VAR, defaults.openai_model),
            hugging_face_key: Credential::from_value(
                lookup(HUGGING_FACE_KEY_VAR).as_deref(),
                HUGGING_FACE_PLACEHOLDER,
            ),
            provider_timeout,
            simulated_latency,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ResolverConfig> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ResolverConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let cfg = config(&[]).unwrap();
        assert!(cfg.groq_key.is_none() && cfg.openai_key.is_none() && cfg.hugging_face_key.is_none());
        assert_eq!(cfg.groq_model, GROQ_DEFAULT_MODEL);
        assert_eq!(cfg.openai_model, OPENAI_DEFAULT_MODEL);
        assert_eq!(cfg.provider_timeout, Duration::from_secs(8));
        assert!(!cfg.simulated_latency);
    }

    #[test]
    fn test_placeholders_count_as_unconfigured() {
        let cfg = config(&[
            (GROQ_KEY_VAR, GROQ_PLACEHOLDER),
            (OPENAI_KEY_VAR, "sk-real"),
            (HUGGING_FACE_KEY_VAR, HUGGING_FACE_PLACEHOLDER),
        ])
        .unwrap();
        assert!(cfg.groq_key.is_none());
        assert_eq!(cfg.openai_key.unwrap().expose(), "sk-real");
        assert!(cfg.hugging_face_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            (GROQ_MODEL_VAR, "llama3-8b-8192"),
            (TIMEOUT_VAR, "3"),
            (LATENCY_VAR, "true"),
        ])
        .unwrap();
        assert_eq!(cfg.groq_model, "llama3-8b-8192");
        assert_eq!(cfg.provider_timeout, Duration::from_secs(3));
        assert!(cfg.simulated_latency);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        assert!(matches!(config(&[(TIMEOUT_VAR, "soon")]), Err(ChatError::Config(_))));
        assert!(matches!(config(&[(TIMEOUT_VAR, "0")]), Err(ChatError::Config(_))));
        assert!(matches!(config(&[(LATENCY_VAR, "maybe")]), Err(ChatError::Config(_))));
    }
}
