use clap::{Parser, Subcommand};
use docchat::chat::RagChat;
use docchat::chunk::Chunker;
use docchat::commands;
use docchat::config::Config;
use docchat::index::DocumentIndexer;
use docchat::provider::OpenAiClient;
use docchat::store::{QdrantStore, VectorStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "docchat",
    version,
    about = "Chat with your documents through retrieval-augmented generation"
)]
struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a file or a directory of documents
    Ingest {
        /// File or directory to ingest
        path: PathBuf,
    },

    /// Ask a single question and exit
    Ask {
        /// The question to answer
        question: String,
    },

    /// Start an interactive chat session
    Chat,

    /// Show collection statistics
    Status,

    /// List indexed documents
    Docs,

    /// Suggest questions the indexed documents can answer
    Suggest {
        /// Number of suggestions
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,
    },

    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Subcommand)]
enum DbCommands {
    /// Delete the collection and all indexed data
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

fn init_logging(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "docchat=info",
            2 => "docchat=debug",
            _ => "trace",
        })
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_indexer(config: &Config) -> anyhow::Result<(Arc<OpenAiClient>, DocumentIndexer)> {
    let api_key = config.api_key()?;
    let client = Arc::new(OpenAiClient::new(&config.openai, api_key)?);

    let store = QdrantStore::connect(
        &config.qdrant_url,
        &config.collection_name,
        config.openai.embedding_dimension,
    )?;
    let chunker = Chunker::new(&config.chunk)?;

    let indexer = DocumentIndexer::new(
        client.clone(),
        Arc::new(store) as Arc<dyn VectorStore>,
        chunker,
    );
    Ok((client, indexer))
}

fn build_chat(config: &Config) -> anyhow::Result<RagChat> {
    let (client, indexer) = build_indexer(config)?;
    Ok(RagChat::new(indexer, client, config))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json);

    let config = Config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Ingest { path } => {
            let (_, indexer) = build_indexer(&config)?;
            indexer.store().ensure_collection().await?;
            let stats = commands::ingest::run(&indexer, &path).await?;
            commands::ingest::print_stats(&stats);
        }
        Commands::Ask { question } => {
            let mut chat = build_chat(&config)?;
            commands::chat::ask(&mut chat, &question).await;
        }
        Commands::Chat => {
            let mut chat = build_chat(&config)?;
            commands::chat::repl(&mut chat).await?;
        }
        Commands::Status => {
            let (_, indexer) = build_indexer(&config)?;
            commands::status::status(&indexer, &config).await;
        }
        Commands::Docs => {
            let (_, indexer) = build_indexer(&config)?;
            commands::status::docs(&indexer).await;
        }
        Commands::Suggest { count } => {
            let chat = build_chat(&config)?;
            commands::status::suggest(&chat, count).await;
        }
        Commands::Db { command } => match command {
            DbCommands::Reset { yes } => {
                let (_, indexer) = build_indexer(&config)?;
                commands::status::reset(&indexer, yes).await?;
            }
        },
    }

    Ok(())
}
