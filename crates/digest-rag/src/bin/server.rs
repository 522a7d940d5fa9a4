//! Summarization and RAG server binary
//!
//! Run with: cargo run -p digest-rag --bin digest-rag-server -- --config digest-rag.toml

use clap::Parser;
use digest_rag::{config::AppConfig, server::AppServer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Video and PDF summaries with retrieval-augmented Q&A
#[derive(Debug, Parser)]
#[command(name = "digest-rag-server", version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind (overrides config and DIGEST_RAG_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides config and DIGEST_RAG_PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "digest_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!("Configuration loaded");
    tracing::info!("  - Chat model: {}", config.openai.chat_model);
    tracing::info!("  - Embedding model: {}", config.openai.embedding_model);
    tracing::info!(
        "  - PDF limits: {} bytes, {} chunks of {} chars",
        config.pdf.max_file_bytes,
        config.pdf.max_chunks,
        config.pdf.max_chunk_chars
    );

    let server = AppServer::new(config)?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/summarizeYoutube - Summarize a YouTube video");
    println!("  POST /api/summarizePdf     - Summarize a PDF");
    println!("  POST /api/rag/upload       - Add a document for Q&A");
    println!("  POST /api/rag/query        - Ask a question");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
