//! docs-rag server binary
//!
//! Run with: cargo run -p docs-rag --bin docs-rag-server
//! Set DOCS_RAG_CONFIG to load a TOML file; secrets come from the environment.

use docs_rag::{
    config::{BackendProvider, RagConfig},
    server::RagServer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docs_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                         Docs RAG                          ║
║        Document Q&A with Retrieval-Augmented Answers      ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    // Load configuration
    let config = RagConfig::load()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Backend: {:?}", config.backend);
    tracing::info!("  - RAG enabled: {}", config.rag_enabled);
    tracing::info!("  - Embedding dimensions: {}", config.embeddings.dimensions);
    tracing::info!(
        "  - Chunk size: {} (overlap {})",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );
    tracing::info!("  - Top K: {}", config.retrieval.top_k);
    match config.backend {
        BackendProvider::Local => {
            tracing::info!("  - Ollama: {}", config.ollama.base_url);
            tracing::info!("  - Embedding model: {}", config.ollama.embed_model);
            tracing::info!("  - LLM model: {}", config.ollama.generate_model);
        }
        BackendProvider::Cloud => {
            tracing::info!("  - Embedding model: {}", config.gemini.embedding_model);
            tracing::info!("  - LLM model: {}", config.gemini.generation_model);
            tracing::info!("  - Pinecone index: {}", config.pinecone.index_name);
        }
    }

    // Create and start server
    let server = RagServer::new(config).await?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST   /api/upload                 - Upload a .md or .txt document");
    println!("  POST   /api/explain                - Explain or ask a question");
    println!("  DELETE /api/documents/:file_name   - Delete a document's chunks");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
