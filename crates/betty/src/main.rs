//! Chat with Betty about the restaurant's purchasing data.
//!
//! Reads `OPENAI_API_KEY` (required), `OPENAI_MODEL`, `OPENAI_BASE_URL`, and
//! `SNAPSHOT_PATH` from the environment or a `.env` file; flags override
//! them. Type `quit` to leave.
//!
//! ```sh
//! marginedge crawl --line-items
//! betty --model gpt-4o-mini
//! ```

use betty::config::BettyConfig;
use betty::prompt::GREETING;
use betty::repl;
use chrono::Local;
use clap::Parser;
use marginedge::analytics::{Dataset, data_summary};
use marginedge::assistant::Assistant;
use marginedge::chat::ChatClient;
use marginedge::snapshot::Snapshot;
use std::io;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Chat with Betty about the restaurant's purchasing data.
#[derive(Parser)]
#[command(name = "betty", version)]
struct Cli {
    /// Model to use (overrides OPENAI_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Snapshot file to answer from (overrides SNAPSHOT_PATH)
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Chat API root (overrides OPENAI_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Sampling temperature
    #[arg(long)]
    temperature: Option<f32>,

    /// Maximum tokens per reply
    #[arg(long)]
    max_tokens: Option<u32>,
}

impl Cli {
    fn apply(self, mut config: BettyConfig) -> BettyConfig {
        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(path) = self.snapshot {
            config.snapshot_path = path;
        }
        if let Some(url) = self.base_url {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if self.temperature.is_some() {
            config.temperature = self.temperature;
        }
        if self.max_tokens.is_some() {
            config.max_tokens = self.max_tokens;
        }
        config
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let config = cli.apply(BettyConfig::from_env().map_err(|e| e.to_string())?);

    println!("{GREETING}");
    let snapshot = match Snapshot::load(&config.snapshot_path) {
        Ok(s) => s,
        Err(e) => {
            println!("Betty: Critical error. Data not found. Mission aborted.");
            return Err(e.to_string());
        }
    };
    let dataset = Arc::new(Dataset::from_snapshot(&snapshot));
    println!("Betty: Data loaded. Awaiting commands.");
    println!("{}", repl::format_summary(&data_summary(&dataset)));

    let chat = ChatClient::with_url(config.api_key.clone(), config.chat_url())?;
    info!("Using {} at {}", config.model, chat.url());
    let tools = config.build_tool_set(dataset, Local::now().date_naive());
    let mut assistant = Assistant::new(chat, tools, config.build_assistant_config());

    repl::run(&mut assistant, io::stdin().lock(), io::stdout())
        .await
        .map_err(|e| format!("terminal I/O failed: {e}"))
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
