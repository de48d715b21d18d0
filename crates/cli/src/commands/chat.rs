//! `playground chat` — Interactive or single-message chat mode.

use std::io::Write;

use playground_config::AppConfig;
use playground_core::message::MessageBuilder;
use playground_core::models::{ModelId, SUPPORTED_MODELS, find_model};
use playground_core::provider::ChatClient;
use playground_core::session::ChatSession;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;

pub struct ChatArgs {
    pub token: Option<String>,
    pub message: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
}

/// One line of REPL input.
#[derive(Debug, PartialEq, Eq)]
enum ReplInput {
    Empty,
    Exit,
    Clear,
    Export,
    ListModels,
    SetModel(String),
    MissingModel,
    Unknown(String),
    Message(String),
}

fn parse_input(raw: &str) -> ReplInput {
    let line = raw.trim();
    if line.is_empty() {
        return ReplInput::Empty;
    }

    match line {
        "exit" | "quit" | "/exit" | "/quit" => return ReplInput::Exit,
        "/clear" => return ReplInput::Clear,
        "/export" => return ReplInput::Export,
        "/models" => return ReplInput::ListModels,
        "/model" => return ReplInput::MissingModel,
        _ => {}
    }

    if let Some(rest) = line.strip_prefix("/model ") {
        let id = rest.trim();
        return if id.is_empty() {
            ReplInput::MissingModel
        } else {
            ReplInput::SetModel(id.to_string())
        };
    }

    if line.starts_with('/') {
        return ReplInput::Unknown(line.to_string());
    }

    ReplInput::Message(raw.to_string())
}

/// Accept a catalog label as well as a raw model id.
fn resolve_model(query: &str) -> ModelId {
    match find_model(query) {
        Some(info) => ModelId::from(info.id),
        None => ModelId::from(query),
    }
}

fn session_from(
    config: &AppConfig,
    args: &ChatArgs,
) -> Result<ChatSession, Box<dyn std::error::Error>> {
    let max_tokens = args.max_tokens.unwrap_or(config.max_tokens);
    if max_tokens == 0 {
        return Err("--max-tokens must be greater than 0".into());
    }

    let model = match &args.model {
        Some(query) => resolve_model(query),
        None => ModelId::from(config.default_model.as_str()),
    };

    let builder = match &config.system_prompt {
        Some(prompt) => MessageBuilder::with_system_prompt(prompt),
        None => MessageBuilder::new(),
    };

    Ok(ChatSession::new(model)
        .with_max_tokens(max_tokens)
        .with_builder(builder))
}

pub async fn run(args: ChatArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(args.token.clone())?;
    super::ensure_token(&config)?;

    let dispatcher = playground_providers::build_from_config(&config)?;
    let mut session = session_from(&config, &args)?;

    if let Some(msg) = args.message {
        // Single message mode
        eprint!("  Thinking...");
        let result = session.send(&dispatcher, &msg).await;
        eprint!("\r              \r");

        return match result {
            Ok(reply) => {
                println!("{reply}");
                Ok(())
            }
            Err(e) => {
                error!(model = %session.model(), error = %e, "Chat request failed");
                Err("request failed".into())
            }
        };
    }

    // Interactive mode
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        LLM Playground — Interactive Mode     ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Backend:    {}", dispatcher.backend_name());
    println!("  Model:      {}", session.model());
    println!("  Max tokens: {}", session.max_tokens());
    println!();
    println!("  Type your message and press Enter.");
    println!("  Commands: /clear, /export, /model <id>, /models");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        match parse_input(&line) {
            ReplInput::Empty => {}
            ReplInput::Exit => break,
            ReplInput::Clear => {
                session.clear();
                println!("  History cleared.");
            }
            ReplInput::Export => match session.export_to(&config.export.dir) {
                Ok(path) => println!("  Saved transcript to {}", path.display()),
                Err(e) => eprintln!("  [Error] {e}"),
            },
            ReplInput::ListModels => print_models(session.model()),
            ReplInput::SetModel(query) => {
                session.set_model(resolve_model(&query));
                println!("  Model: {}", session.model());
            }
            ReplInput::MissingModel => eprintln!("  Usage: /model <id>"),
            ReplInput::Unknown(cmd) => eprintln!("  Unknown command: {cmd}"),
            ReplInput::Message(text) => turn(&mut session, &dispatcher, &text).await,
        }

        prompt()?;
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}

async fn turn(session: &mut ChatSession, client: &dyn ChatClient, text: &str) {
    eprint!("  ...");
    let result = session.send(client, text).await;
    eprint!("\r     \r");

    match result {
        Ok(reply) => {
            println!();
            for line in reply.lines() {
                println!("  Assistant > {line}");
            }
            println!();
        }
        Err(e) => {
            error!(model = %session.model(), error = %e, "Chat request failed");
            eprintln!("  [Error] request failed");
            println!();
        }
    }
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

fn print_models(current: &ModelId) {
    for m in SUPPORTED_MODELS {
        let marker = if m.id == current.as_str() { "*" } else { " " };
        println!("  {marker} {:<28} {}", m.label, m.id);
    }
}
