//! # Harborline CLI (`harborline`)
//!
//! Command-line interface for the Harborline Family Services assistant:
//! a retrieval-augmented question answering pipeline over the
//! organization's knowledge base.
//!
//! ## Usage
//!
//! ```bash
//! harborline --config ./config/harborline.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `harborline init` | Create the vector store file and run schema migrations |
//! | `harborline index` | Ingest the knowledge-base JSON files into the store |
//! | `harborline ask "<question>"` | Answer a question from the indexed knowledge base |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use harborline::{config, db, embedder, gateway, ingest, migrate, service, store_sqlite};
use harborline_core::models::Language;

/// Harborline CLI — grounded question answering for a settlement-services
/// non-profit.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/harborline.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "harborline",
    about = "Harborline — grounded question answering over a settlement-services knowledge base",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/harborline.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the vector store.
    ///
    /// Creates the SQLite store file and the collections/points schema.
    /// Idempotent — running it multiple times is safe.
    Init,

    /// Build (or rebuild) the knowledge-base index.
    ///
    /// Reads the known JSON resources from the data directory, flattens
    /// them into chunks, embeds every chunk, and upserts the vectors into
    /// the configured collection. Missing resource files are skipped.
    Index {
        /// Directory holding the knowledge-base JSON files.
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,
    },

    /// Answer a question from the indexed knowledge base.
    Ask {
        /// The user's question.
        query: String,

        /// Response language: `en` or `vi`. Unknown codes fall back to `en`.
        #[arg(long, default_value = "en")]
        language: String,

        /// Also print the assembled retrieval context.
        #[arg(long)]
        show_context: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let pool = db::connect(&cfg).await?;
            migrate::run_migrations(&pool).await?;
            println!("store initialized at {}", cfg.store.path.display());
        }
        Commands::Index { data_dir } => {
            let pool = db::connect(&cfg).await?;
            migrate::run_migrations(&pool).await?;
            let store = store_sqlite::SqliteIndex::new(pool);
            let embedder = embedder::create_embedder(&cfg.embedding)?;

            let report =
                ingest::index_documents(&store, embedder.as_ref(), &cfg, &data_dir).await?;
            for (file, count) in &report.files {
                println!("  {file}: {count} chunks");
            }
            println!(
                "indexed {} chunks into '{}' ({} dims, model {})",
                report.chunks_indexed,
                cfg.store.collection,
                embedder.dims(),
                embedder.model_name()
            );
        }
        Commands::Ask {
            query,
            language,
            show_context,
        } => {
            let language: Language = language.parse().unwrap_or_default();
            let pool = db::connect(&cfg).await?;
            migrate::run_migrations(&pool).await?;

            let ctx = service::AppContext {
                embedder: embedder::create_embedder(&cfg.embedding)?,
                store: Box::new(store_sqlite::SqliteIndex::new(pool)),
                generator: Box::new(gateway::HttpGateway::new(&cfg.gateway)?),
                config: cfg,
            };

            let answer = service::answer_query(&ctx, &query, language).await;

            println!("{}", answer.response);
            if !answer.retrieved_docs.is_empty() {
                println!();
                println!("sources:");
                for doc in &answer.retrieved_docs {
                    println!("  {} (score {:.3})", doc.source, doc.score);
                }
            }
            if show_context && !answer.context.is_empty() {
                println!();
                println!("context:");
                println!("{}", answer.context);
            }
        }
    }

    Ok(())
}
