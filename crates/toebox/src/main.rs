//! # toebox CLI
//!
//! Command-line interface for the toebox shoe-recommendation pipeline.
//!
//! ## Commands
//!
//! - `toebox ingest --sitemap-url <URL>` - ingest sitemap/document sources
//!   into the configured vector store
//! - `toebox ask "<QUESTION>"` - answer a question through the full
//!   retrieval pipeline
//! - `toebox status` - show what the configured store currently holds
//!
//! ## Examples
//!
//! ```bash
//! # Ingest review content enumerated by a sitemap
//! toebox ingest --sitemap-url https://example.com/sitemap.xml
//!
//! # Ask a question against the ingested content and the shoe catalog
//! toebox ask "Show me zero drop trail shoes" --database shoes.db
//!
//! # Get JSON output
//! toebox status --format json
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use toebox_core::{ChatMessage, Role, RunConfig};
use toebox_graph::{ConversationState, ShoeGraph};
use toebox_ingest::{ingest, open_retriever};
use toebox_query::SqliteCatalog;
use toebox_store::storage_dir;

#[derive(Parser)]
#[command(name = "toebox")]
#[command(about = "Shoe-recommendation retrieval pipeline")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Configuration overrides shared by all commands. Anything not given
/// keeps its default.
#[derive(Args)]
struct ConfigArgs {
    /// Owner partition key
    #[arg(long)]
    user_id: Option<String>,

    /// Embedding model (provider/model)
    #[arg(long)]
    embedding_model: Option<String>,

    /// Retriever provider (memory, local-file, remote-http)
    #[arg(long)]
    retriever_provider: Option<String>,

    /// Document file or directory path (repeatable)
    #[arg(long = "document-path")]
    document_paths: Vec<PathBuf>,

    /// Sitemap URL (repeatable)
    #[arg(long = "sitemap-url")]
    sitemap_urls: Vec<String>,

    /// Recency weight in [0, 1]
    #[arg(long)]
    recency_weight: Option<f32>,

    /// Chat model for responses (provider/model)
    #[arg(long)]
    response_model: Option<String>,

    /// Chat model for query generation and routing (provider/model)
    #[arg(long)]
    query_model: Option<String>,

    /// Base directory for persisted vector indices
    #[arg(long)]
    index_dir: Option<PathBuf>,
}

impl ConfigArgs {
    fn into_config(self) -> Result<RunConfig> {
        let mut config = RunConfig::default();
        if let Some(user_id) = self.user_id {
            config.user_id = user_id;
        }
        if let Some(model) = self.embedding_model {
            config.embedding_model = model;
        }
        if let Some(provider) = self.retriever_provider {
            config.retriever_provider =
                serde_json::from_value(serde_json::Value::String(provider.clone()))
                    .with_context(|| format!("unknown retriever provider: {provider}"))?;
        }
        if !self.document_paths.is_empty() {
            config.document_paths = self.document_paths;
        }
        if !self.sitemap_urls.is_empty() {
            config.sitemap_urls = self.sitemap_urls;
        }
        if let Some(weight) = self.recency_weight {
            anyhow::ensure!(
                (0.0..=1.0).contains(&weight),
                "recency weight must be in [0, 1], got {weight}"
            );
            config.recency_weight = weight;
        }
        if let Some(model) = self.response_model {
            config.response_model = model;
        }
        if let Some(model) = self.query_model {
            config.query_model = model;
        }
        if let Some(dir) = self.index_dir {
            config.index_dir = dir;
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest the configured sources into the vector store
    Ingest {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Answer a question through the retrieval pipeline
    Ask {
        /// The question to answer
        question: String,

        /// Path to the shoe catalog database
        #[arg(long, default_value = "shoes.db")]
        database: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Show what the configured store currently holds
    Status {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

#[derive(Serialize)]
struct IngestOutput {
    documents_added: usize,
    sources_skipped: usize,
    sitemaps_skipped: usize,
    failures: usize,
}

#[derive(Serialize)]
struct StatusOutput {
    storage_dir: String,
    documents: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match cli.command {
        Commands::Ingest { config } => {
            let config = config.into_config()?;
            anyhow::ensure!(
                !config.sitemap_urls.is_empty() || !config.document_paths.is_empty(),
                "provide at least one --sitemap-url or --document-path"
            );

            info!("Starting document ingestion");
            let report = ingest(&config).await?;

            match cli.format {
                OutputFormat::Json => {
                    let output = IngestOutput {
                        documents_added: report.documents_added,
                        sources_skipped: report.sources_skipped,
                        sitemaps_skipped: report.sitemaps_skipped,
                        failures: report.failures,
                    };
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Text => {
                    println!("Documents added:  {}", report.documents_added);
                    println!("Sources skipped:  {}", report.sources_skipped);
                    println!("Sitemaps skipped: {}", report.sitemaps_skipped);
                    println!("Failures:         {}", report.failures);
                }
            }
        }

        Commands::Ask {
            question,
            database,
            config,
        } => {
            let config = config.into_config()?;
            anyhow::ensure!(
                database.exists(),
                "shoe catalog not found at {}",
                database.display()
            );

            let catalog = Arc::new(
                SqliteCatalog::open(&database).context("Failed to open shoe catalog")?,
            );
            let graph = ShoeGraph::new(config, catalog)?;

            let mut state = ConversationState::new(vec![ChatMessage::user(&question)]);
            graph.run(&mut state).await?;

            let answer = state
                .messages
                .iter()
                .rev()
                .find(|m| m.role == Role::Assistant)
                .map(|m| m.content.as_str())
                .unwrap_or("(no answer produced)");

            match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&serde_json::json!({
                            "question": question,
                            "answer": answer,
                            "queries": state.queries,
                            "matched_shoes": state.relevant_shoes.len(),
                            "retrieved_docs": state.retrieved_docs.len(),
                        }))?
                    );
                }
                OutputFormat::Text => {
                    println!("{answer}");
                }
            }
        }

        Commands::Status { config } => {
            let config = config.into_config()?;
            let dir = storage_dir(&config);

            match open_retriever(&config).await {
                Ok(store) => {
                    let documents = store.count().await.map_err(toebox_core::Error::Store)?;
                    match cli.format {
                        OutputFormat::Json => {
                            let output = StatusOutput {
                                storage_dir: dir.to_string_lossy().into_owned(),
                                documents,
                            };
                            println!("{}", serde_json::to_string_pretty(&output)?);
                        }
                        OutputFormat::Text => {
                            println!("Store:     {}", dir.display());
                            println!("Documents: {documents}");
                        }
                    }
                }
                Err(e) => match cli.format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::json!({ "error": e.to_string() }));
                    }
                    OutputFormat::Text => {
                        println!("{e}");
                        println!("Run 'toebox ingest' to create the store.");
                    }
                },
            }
        }
    }

    Ok(())
}
