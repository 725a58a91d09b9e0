//! Index administration CLI
//!
//! Run with: cargo run -p docs-rag --bin docs-rag-index -- create-index

use clap::{Parser, Subcommand};

use docs_rag::{
    config::RagConfig,
    providers::{CreateIndexOutcome, MetadataFilter, PineconeStore, VectorStoreProvider},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "docs-rag-index", version, about = "Manage the docs-rag Pinecone index")]
struct Cli {
    /// TOML config file (defaults to $DOCS_RAG_CONFIG)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the serverless index (an existing index is left as is)
    CreateIndex {
        /// Index name (defaults to the configured one)
        #[arg(long)]
        name: Option<String>,
        /// Vector dimension (defaults to embeddings.dimensions)
        #[arg(long)]
        dimension: Option<usize>,
    },
    /// Delete every chunk stored for a file name
    Delete {
        /// File name as uploaded
        file_name: String,
    },
    /// Print index statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docs_rag=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let mut config = RagConfig::from_file(path)?;
            config.apply_env(|key| std::env::var(key).ok());
            config
        }
        None => RagConfig::load()?,
    };

    match cli.command {
        Command::CreateIndex { name, dimension } => {
            if let Some(name) = name {
                config.pinecone.index_name = name;
            }
            let dimension = dimension.unwrap_or(config.embeddings.dimensions);

            println!(
                "Creating index {} (dimension {}, metric {}, {} {})",
                config.pinecone.index_name,
                dimension,
                config.pinecone.metric,
                config.pinecone.cloud,
                config.pinecone.region
            );

            match PineconeStore::create_index(&config.pinecone, dimension).await? {
                CreateIndexOutcome::Created => println!("Index created"),
                CreateIndexOutcome::AlreadyExists => println!("Index already exists"),
            }

            match PineconeStore::describe_index_host(&config.pinecone).await {
                Ok(host) => println!("Set PINECONE_HOST={}", host),
                Err(e) => tracing::warn!("Could not look up index host yet: {}", e),
            }
        }
        Command::Delete { file_name } => {
            let store = PineconeStore::new(&config.pinecone)?;
            store
                .delete_many(&MetadataFilter::FileName(file_name.clone()))
                .await?;
            println!("Deleted chunks of {}", file_name);
        }
        Command::Stats => {
            let store = PineconeStore::new(&config.pinecone)?;
            let stats = store.describe().await?;
            println!("Index: {}", config.pinecone.index_name);
            println!("  Records: {}", stats.total_records);
            if let Some(dimension) = stats.dimension {
                println!("  Dimension: {}", dimension);
            }
        }
    }

    Ok(())
}
