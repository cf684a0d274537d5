#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use sitechat::answer::{AnswerGenerator, Language, RetryPolicy};
use sitechat::config::Config;
use sitechat::error::LlmError;
use sitechat::gateway;
use sitechat::providers::GeminiClient;
use sitechat::retrieval::{assemble_context, find_relevant_chunks};
use sitechat::scrape;

#[derive(Parser)]
#[command(
    name = "sitechat",
    version,
    about = "Ask questions about any public website"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP gateway
    Serve {
        /// Bind host (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Bind port (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Fetch a page and print its extracted text chunks
    Analyze { url: String },
    /// Answer a question about a page
    Ask {
        url: String,
        question: String,
        /// Answer language code (en, hi, te)
        #[arg(long, default_value = "en")]
        language: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();
    let config = Config::load_or_init()?;

    match cli.command {
        Command::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.gateway.host.clone());
            let port = port.unwrap_or(config.gateway.port);
            gateway::run_gateway(&host, port, config).await
        }
        Command::Analyze { url } => run_analyze(&config, &url).await,
        Command::Ask {
            url,
            question,
            language,
        } => run_ask(&config, &url, &question, &language).await,
    }
}

async fn run_analyze(config: &Config, url: &str) -> Result<()> {
    let client = scrape::build_page_client(
        config.scrape.fetch_timeout_secs,
        &config.scrape.user_agent,
    );
    let analysis = scrape::analyze_url(&client, url, config.scrape.chunk_size).await?;

    println!("Title: {}", analysis.title);
    println!("Content: {} chars", analysis.content.chars().count());
    println!("Chunks: {}", analysis.chunks.len());
    for (index, chunk) in analysis.chunks.iter().enumerate() {
        println!("\n-- chunk {index} ({} chars) --", chunk.chars().count());
        println!("{chunk}");
    }
    Ok(())
}

async fn run_ask(config: &Config, url: &str, question: &str, language: &str) -> Result<()> {
    let api_key = config.resolve_api_key().ok_or(LlmError::MissingApiKey)?;

    let client = scrape::build_page_client(
        config.scrape.fetch_timeout_secs,
        &config.scrape.user_agent,
    );
    let analysis = scrape::analyze_url(&client, url, config.scrape.chunk_size).await?;

    let relevant = find_relevant_chunks(question, &analysis.chunks, config.retrieval.top_k);
    let context = assemble_context(&relevant, &analysis.content, config.retrieval.context_limit);

    let gemini = GeminiClient::new(
        &api_key,
        config.gemini.temperature,
        config.gemini.max_output_tokens,
    );
    let answerer = AnswerGenerator::new(
        gemini,
        config.gemini.models.clone(),
        RetryPolicy::new(config.gemini.max_retries),
    );
    let result = answerer
        .answer(question, Some(url), Language::from_code(language), &context)
        .await;

    if result.is_rate_limited() {
        anyhow::bail!("API quota exceeded. Please wait a moment and try again.");
    }

    println!("{}", result.text);
    Ok(())
}
