//! LLM Playground CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Write a default config file
//! - `chat`    — Interactive chat or single-message mode
//! - `serve`   — Start the browser playground
//! - `models`  — List the model catalog
//! - `status`  — Show the effective configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "playground",
    about = "LLM Playground — chat with hosted Hugging Face models",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Hugging Face API token (overrides the config file)
    #[arg(long, global = true, env = "PLAYGROUND_HF_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Onboard,

    /// Chat with a model from the terminal
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Model id or catalog label
        #[arg(long)]
        model: Option<String>,

        /// Output budget per reply
        #[arg(long)]
        max_tokens: Option<u32>,
    },

    /// Start the browser playground
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List available models
    Models,

    /// Show the effective configuration
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Chat {
            message,
            model,
            max_tokens,
        } => {
            commands::chat::run(commands::chat::ChatArgs {
                token: cli.token,
                message,
                model,
                max_tokens,
            })
            .await?
        }
        Commands::Serve { port } => commands::serve::run(cli.token, port).await?,
        Commands::Models => commands::models::run().await?,
        Commands::Status => commands::status::run(cli.token).await?,
    }

    Ok(())
}
