mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use open_skills::config;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "open-skills", version, about = "Versioned skill registry and embedding service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP service
    Serve,
    /// Embed a piece of text and print the vector as JSON
    Embed {
        /// Text to embed
        text: String,
        /// Provider identifier (see `providers`)
        #[arg(long, short)]
        provider: String,
        /// Model override; defaults to the provider's default model
        #[arg(long, short)]
        model: Option<String>,
    },
    /// List supported embedding providers
    Providers,
    /// Create or migrate the database
    InitDb,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::OpenSkillsConfig::load()?;

    // Log to stderr so stdout stays clean for command output.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => {
            open_skills::service::serve(config).await?;
        }
        Command::Embed {
            text,
            provider,
            model,
        } => {
            cli::embed::embed(&config, &text, &provider, model.as_deref()).await?;
        }
        Command::Providers => {
            cli::providers::providers();
        }
        Command::InitDb => {
            cli::init_db::init_db(&config).await?;
        }
    }

    Ok(())
}
