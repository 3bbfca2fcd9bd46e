use crate::config::ResolverConfig;
use crate::huggingface::HuggingFaceProvider;
use crate::logging;
use crate::openai::ChatCompletionsProvider;
use crate::personality;
use crate::provider::{Provider, Unavailable};
use crate::responder::LocalResponder;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const LOCAL_STAGE: &str = "local";

/// Which stage produced a response. Diagnostic only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    Provider(String),
    Local,
}

impl Provenance {
    pub fn as_str(&self) -> &str {
        match self {
            Provenance::Provider(name) => name,
            Provenance::Local => LOCAL_STAGE,
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResponse {
    pub text: String,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub name: String,
    pub available: bool,
}

/// Tries each provider once, in priority order, then answers locally
pub struct ResponseResolver {
    providers: Vec<Box<dyn Provider>>,
    responder: LocalResponder,
    provider_timeout: Duration,
}

impl ResponseResolver {
    pub fn new(providers: Vec<Box<dyn Provider>>, responder: LocalResponder, provider_timeout: Duration) -> Self {
        Self {
            providers,
            responder,
            provider_timeout,
        }
    }

    /// Build the standard chain: Groq, then OpenAI, then Hugging Face, then local
    pub fn from_config(config: &ResolverConfig) -> Self {
        let providers: Vec<Box<dyn Provider>> = vec![
            Box::new(ChatCompletionsProvider::groq(config.groq_key.clone(), &config.groq_model)),
            Box::new(ChatCompletionsProvider::openai(config.openai_key.clone(), &config.openai_model)),
            Box::new(HuggingFaceProvider::new(config.hugging_face_key.clone())),
        ];

        let responder = if config.simulated_latency {
            LocalResponder::new().with_simulated_latency()
        } else {
            LocalResponder::new()
        };

        Self::new(providers, responder, config.provider_timeout)
    }

    /// Local responder only
    pub fn offline() -> Self {
        Self::new(Vec::new(), LocalResponder::new(), Duration::from_secs(crate::config::DEFAULT_PROVIDER_TIMEOUT_SECS))
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Configuration-only availability report, no network calls
    pub fn health(&self) -> Vec<ServiceHealth> {
        let mut services: Vec<ServiceHealth> = self.providers
            .iter()
            .map(|p| ServiceHealth {
                name: p.name().to_string(),
                available: p.is_configured(),
            })
            .collect();
        services.push(ServiceHealth {
            name: LOCAL_STAGE.to_string(),
            available: true,
        });
        logging::log_routing(&format!(
            "Health check: {}",
            services
                .iter()
                .map(|s| format!("{}={}", s.name, s.available))
                .collect::<Vec<_>>()
                .join(", ")
        ));
        services
    }

    /// Resolve a response using OS-seeded randomness
    pub async fn resolve(&self, message: &str, personality_id: &str) -> ResolvedResponse {
        let mut rng = StdRng::from_os_rng();
        self.resolve_with_rng(message, personality_id, &mut rng).await
    }

    /// Resolve a response with caller-supplied randomness. Never fails.
    pub async fn resolve_with_rng<R: Rng + Send>(
        &self,
        message: &str,
        personality_id: &str,
        rng: &mut R,
    ) -> ResolvedResponse {
        let personality = personality::get_or_default(personality_id);

        logging::log_routing(&format!(
            "Resolving for personality={} message=\"{}\"",
            personality.id,
            logging::preview(message)
        ));

        for provider in &self.providers {
            match self.attempt(provider.as_ref(), message, personality.system_prompt).await {
                Ok(raw) => {
                    let text = personality.finish(&raw, rng);
                    if text.trim().is_empty() {
                        logging::log_provider(&format!("{} unavailable: {}", provider.name(), Unavailable::EmptyPayload));
                        continue;
                    }
                    logging::log_routing(&format!("Using {} response", provider.name()));
                    return ResolvedResponse {
                        text,
                        provenance: Provenance::Provider(provider.name().to_string()),
                    };
                }
                Err(reason) => {
                    logging::log_provider(&format!("{} unavailable: {}", provider.name(), reason));
                }
            }
        }

        logging::log_routing("All providers unavailable, using local responder");
        let text = self.responder.respond(message, personality.id.as_str(), rng).await;

        ResolvedResponse {
            text,
            provenance: Provenance::Local,
        }
    }

    /// One bounded attempt against a single provider
    async fn attempt(&self, provider: &dyn Provider, message: &str, system_prompt: &str) -> Result<String, Unavailable> {
        if !provider.is_configured() {
            return Err(Unavailable::MissingCredential);
        }

        match tokio::time::timeout(self.provider_timeout, provider.try_generate(message, system_prompt)).await {
            Ok(result) => result,
            Err(_) => Err(Unavailable::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderResult;
    use crate::responder::compose;
    use crate::test_support::serve_silence;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    enum Behaviour {
        Reply(&'static str),
        Fail(Unavailable),
        Hang,
        Blank,
    }

    struct StubProvider {
        name: &'static str,
        configured: bool,
        behaviour: Behaviour,
        calls: Arc<AtomicUsize>,
    }

    impl StubProvider {
        fn boxed(name: &'static str, behaviour: Behaviour) -> (Box<dyn Provider>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let stub = StubProvider {
                name,
                configured: true,
                behaviour,
                calls: calls.clone(),
            };
            (Box::new(stub), calls)
        }
    }

    #[async_trait]
    impl Provider for StubProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn try_generate(&self, _message: &str, _system_prompt: &str) -> ProviderResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behaviour {
                Behaviour::Reply(text) => Ok(text.to_string()),
                Behaviour::Fail(reason) => Err(reason.clone()),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok("too late".to_string())
                }
                Behaviour::Blank => Ok("   ".to_string()),
            }
        }
    }

    fn resolver(providers: Vec<Box<dyn Provider>>) -> ResponseResolver {
        ResponseResolver::new(providers, LocalResponder::new(), Duration::from_millis(200))
    }

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[tokio::test]
    async fn test_first_provider_wins() {
        let (p1, calls1) = StubProvider::boxed("first", Behaviour::Reply("Assistant: from first"));
        let (p2, calls2) = StubProvider::boxed("second", Behaviour::Reply("from second"));
        let resolved = resolver(vec![p1, p2]).resolve_with_rng("hello", "technical", &mut seeded()).await;

        assert_eq!(resolved.text, "from first");
        assert_eq!(resolved.provenance, Provenance::Provider("first".to_string()));
        assert_eq!(calls1.load(Ordering::SeqCst), 1);
        assert_eq!(calls2.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failures_fall_through_in_order() {
        let (p1, calls1) = StubProvider::boxed("a", Behaviour::Fail(Unavailable::Status(500)));
        let (p2, calls2) = StubProvider::boxed("b", Behaviour::Blank);
        let (p3, calls3) = StubProvider::boxed("c", Behaviour::Reply("third time lucky"));
        let resolved = resolver(vec![p1, p2, p3]).resolve_with_rng("hey", "helpful", &mut seeded()).await;

        assert_eq!(resolved.text, "third time lucky");
        assert_eq!(resolved.provenance.as_str(), "c");
        for calls in [calls1, calls2, calls3] {
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_unconfigured_provider_is_never_called() {
        let calls = Arc::new(AtomicUsize::new(0));
        let stub = StubProvider {
            name: "nokey",
            configured: false,
            behaviour: Behaviour::Reply("should not appear"),
            calls: calls.clone(),
        };
        let resolved = resolver(vec![Box::new(stub)]).resolve_with_rng("hello", "helpful", &mut seeded()).await;
        assert_eq!(resolved.provenance, Provenance::Local);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let (slow, _) = StubProvider::boxed("slow", Behaviour::Hang);
        let (fast, _) = StubProvider::boxed("fast", Behaviour::Reply("quick answer"));
        let started = std::time::Instant::now();
        let resolved = resolver(vec![slow, fast]).resolve_with_rng("hi", "helpful", &mut seeded()).await;

        assert_eq!(resolved.text, "quick answer");
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_silent_http_provider_times_out_to_local() {
        let base = serve_silence().await;
        let key = crate::provider::Credential::from_value(Some("k"), "x");
        let provider = ChatCompletionsProvider::groq(key, "m").with_base_url(&base);
        let resolved = resolver(vec![Box::new(provider)])
            .resolve_with_rng("hello", "helpful", &mut seeded())
            .await;
        assert_eq!(resolved.provenance, Provenance::Local);
    }

    #[tokio::test]
    async fn test_all_unavailable_uses_local_knowledge() {
        let (p1, _) = StubProvider::boxed("a", Behaviour::Fail(Unavailable::MissingCredential));
        let (p2, _) = StubProvider::boxed("b", Behaviour::Fail(Unavailable::Transport("connect".into())));
        let resolved = resolver(vec![p1, p2])
            .resolve_with_rng("I keep getting lost in javascript", "helpful", &mut seeded())
            .await;

        assert_eq!(resolved.provenance, Provenance::Local);
        assert!(resolved.text.contains(crate::knowledge::lookup("javascript").unwrap()));
    }

    #[tokio::test]
    async fn test_what_is_react_offline() {
        let resolved = ResponseResolver::offline()
            .resolve_with_rng("What is React?", "helpful", &mut seeded())
            .await;
        assert!(resolved.text.contains("React"));
    }

    #[tokio::test]
    async fn test_unknown_personality_behaves_like_helpful() {
        let offline = ResponseResolver::offline();
        let unknown = offline.resolve_with_rng("hello", "nonexistent-id", &mut seeded()).await;
        let helpful = offline.resolve_with_rng("hello", "helpful", &mut seeded()).await;
        assert_eq!(unknown, helpful);
    }

    #[tokio::test]
    async fn test_provider_text_is_decorated_like_local() {
        // Same seed, same decoration decision for provider text and local text
        let (p, _) = StubProvider::boxed("remote", Behaviour::Reply("Bot: remote words"));
        let mut rng_a = StdRng::seed_from_u64(3);
        let mut rng_b = StdRng::seed_from_u64(3);
        let friendly = personality::get_or_default("friendly");

        let resolved = resolver(vec![p]).resolve_with_rng("hi", "friendly", &mut rng_a).await;
        assert_eq!(resolved.text, friendly.decorate("remote words", &mut rng_b));
    }

    #[tokio::test]
    async fn test_totality_over_odd_inputs() {
        let (p, _) = StubProvider::boxed("broken", Behaviour::Fail(Unavailable::Decode));
        let chain = resolver(vec![p]);
        let long = "x".repeat(5000);
        let messages = ["", " ", "?", "🎨🎨🎨", "hi", "what is", "explain ?", long.as_str()];
        for message in messages {
            for id in ["helpful", "creative", "technical", "friendly", "", "HELPFUL", "robot"] {
                let resolved = chain.resolve_with_rng(message, id, &mut seeded()).await;
                assert!(!resolved.text.trim().is_empty(), "{:?} {:?}", message, id);
            }
        }
    }

    #[tokio::test]
    async fn test_local_text_matches_composer() {
        let offline = ResponseResolver::offline();
        let resolved = offline.resolve_with_rng("hello", "technical", &mut seeded()).await;
        let expected = compose("hello", personality::get_or_default("technical"), &mut seeded());
        assert_eq!(resolved.text, expected);
    }

    #[test]
    fn test_health_reports_configuration() {
        let cfg = ResolverConfig::from_lookup(|key| match key {
            "OPENAI_API_KEY" => Some("sk-live".to_string()),
            "GROQ_API_KEY" => Some("YOUR_GROQ_API_KEY".to_string()),
            _ => None,
        })
        .unwrap();
        let chain = ResponseResolver::from_config(&cfg);
        assert_eq!(chain.provider_names(), vec!["groq", "openai", "huggingface"]);

        let health = chain.health();
        let status: Vec<(&str, bool)> = health.iter().map(|s| (s.name.as_str(), s.available)).collect();
        assert_eq!(
            status,
            vec![("groq", false), ("openai", true), ("huggingface", false), ("local", true)]
        );
    }

    #[tokio::test]
    async fn test_resolve_with_os_randomness() {
        let resolved = ResponseResolver::offline().resolve("Tell me a story", "creative").await;
        assert_eq!(resolved.provenance, Provenance::Local);
        assert!(!resolved.text.is_empty());
    }
}
