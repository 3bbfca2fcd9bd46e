pub mod classifier;
pub mod config;
pub mod conversation;
pub mod error;
pub mod huggingface;
pub mod knowledge;
pub mod logging;
pub mod openai;
pub mod personality;
pub mod provider;
pub mod resolver;
pub mod responder;

#[cfg(test)]
mod test_support;

use clap::Parser;
use config::ResolverConfig;
use conversation::{ChatSession, MemoryStore};
use once_cell::sync::Lazy;
use resolver::ResponseResolver;
use std::io::Write;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};

pub use error::ChatError;
pub use personality::PersonalityId;
pub use resolver::{Provenance, ResolvedResponse};

/// Process-wide resolver built from the environment on first use
static DEFAULT_RESOLVER: Lazy<ResponseResolver> = Lazy::new(|| {
    let config = ResolverConfig::from_env().unwrap_or_else(|e| {
        logging::log_error(None, &format!("{}; using default configuration", e));
        ResolverConfig::default()
    });
    ResponseResolver::from_config(&config)
});

pub fn default_resolver() -> &'static ResponseResolver {
    &DEFAULT_RESOLVER
}

/// Get a displayable response for a message. Always returns non-empty text.
pub async fn get_response(message: &str, personality: &str) -> String {
    DEFAULT_RESOLVER.resolve(message, personality).await.text
}

// ============ CLI ============

#[derive(Parser, Debug)]
#[command(name = "chatmate")]
#[command(version)]
#[command(about = "Personality-driven chat responder with provider fallback")]
struct Cli {
    /// Personality to answer with (helpful, creative, technical, friendly)
    #[arg(short, long, default_value = "helpful")]
    personality: String,

    /// Show which response providers are configured and exit
    #[arg(long)]
    health: bool,

    /// List the available personalities and exit
    #[arg(long)]
    personalities: bool,

    /// Message to answer; starts an interactive chat when omitted
    message: Vec<String>,
}

const CHAT_HELP: &str = "Commands: /new, /personality <name>, /export, /quit";

pub fn run() -> ExitCode {
    logging::init_logging();
    let cli = Cli::parse();

    if cli.personalities {
        for p in personality::all() {
            println!("{} {:<10} {} - {}", p.avatar, p.id, p.name, p.description);
        }
        return ExitCode::SUCCESS;
    }

    let config = match ResolverConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let resolver = ResponseResolver::from_config(&config);

    if cli.health {
        for service in resolver.health() {
            let status = if service.available { "available" } else { "not configured" };
            println!("{:<12} {}", service.name, status);
        }
        return ExitCode::SUCCESS;
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if !cli.message.is_empty() {
        let message = cli.message.join(" ");
        let resolved = runtime.block_on(resolver.resolve(&message, &cli.personality));
        println!("{}", resolved.text);
        return ExitCode::SUCCESS;
    }

    match runtime.block_on(interactive(&resolver, &cli.personality)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Argument of a `/personality` command; empty when no name was given
fn personality_command(line: &str) -> Option<&str> {
    match line.strip_prefix("/personality")? {
        "" => Some(""),
        rest if rest.starts_with(char::is_whitespace) => Some(rest.trim()),
        _ => None,
    }
}

async fn interactive(resolver: &ResponseResolver, personality_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = ChatSession::open(resolver, MemoryStore::new());
    session.set_personality(personality_id);

    let avatar = |id: PersonalityId| personality::by_id(id).avatar;
    println!("{} {} ready. {}", avatar(session.personality()), personality::by_id(session.personality()).name, CHAT_HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/new" => {
                let title = session.create_conversation(None)?.title.clone();
                println!("Started {}", title);
            }
            "/export" => match session.active_conversation().map(|c| c.id.clone()) {
                Some(id) => println!("{}", session.export_conversation(&id)?),
                None => println!("Nothing to export yet."),
            },
            "/help" => println!("{}", CHAT_HELP),
            _ => {
                if let Some(name) = personality_command(line) {
                    if !name.is_empty() {
                        session.set_personality(name);
                    }
                    let current = personality::by_id(session.personality());
                    println!("{} Now chatting with {}", current.avatar, current.name);
                    continue;
                }
                let reply = session.send_message(line).await?;
                println!("{} {}", avatar(session.personality()), reply.content);
            }
        }
    }

    Ok(())
}
