//! doc-chat server binary
//!
//! Run with: cargo run -p doc-chat --bin doc-chat-server

use doc_chat::{config::DocChatConfig, server::DocChatServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "doc_chat=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                         doc-chat                          ║
║          Chat with your documents, sources cited          ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    let config = DocChatConfig::load()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Backend: {:?} at {}", config.llm.backend, config.llm.base_url);
    tracing::info!("  - Model: {}", config.llm.model);
    tracing::info!("  - Chunk size: {}", config.limits.chunk_size);
    tracing::info!("  - Database: {}", config.storage.database_path.display());
    tracing::info!("  - Blobs: {}", config.storage.blob_dir.display());

    let server = DocChatServer::new(config).await?;

    match server.llm_health().await {
        true => tracing::info!("Completion backend is reachable"),
        false => tracing::warn!("Completion backend not reachable; chat requests will fail until it is"),
    }

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/documents        - Upload a document");
    println!("  POST /api/process-document - (Re)process a stored document");
    println!("  POST /api/chat             - Ask a question");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
