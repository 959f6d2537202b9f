use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use reviewbot_cli::{
    AppConfig, BannerInfo, FileHistoryStore, ReviewChat, TerminalInput, display_banner, logging,
    run_loop,
};
use reviewbot_core::{EmbeddingProvider, HistoryStore, SessionKey};
use reviewbot_ollama::OllamaClient;
use reviewbot_rag::{BuildOutcome, IndexBuilder, LocalVectorStore, VectorRetriever, load_corpus};

#[derive(Parser)]
#[command(name = "reviewbot")]
#[command(about = "Ask questions about the Naruto review corpus", long_about = None)]
struct Cli {
    /// CSV file with Title, Date, Best Character, Rating and Review columns
    #[arg(long, env = "REVIEWBOT_CORPUS", default_value = "Naruto_reviews.csv")]
    corpus: PathBuf,

    /// Directory holding the vector index; built on first run only
    #[arg(long, env = "REVIEWBOT_INDEX_DIR", default_value = "review_vector_db")]
    index_dir: PathBuf,

    /// Directory holding one conversation log per session
    #[arg(long, env = "REVIEWBOT_HISTORY_DIR", default_value = "chat_history")]
    history_dir: PathBuf,

    /// Conversation to continue
    #[arg(long, env = "REVIEWBOT_SESSION", default_value = SessionKey::DEFAULT)]
    session: String,

    /// Answer every question on its own, without conversation history
    #[arg(long)]
    no_history: bool,

    /// Number of reviews retrieved per question (1 to 10)
    #[arg(long, default_value_t = reviewbot_rag::DEFAULT_TOP_K)]
    top_k: usize,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> AppConfig {
        AppConfig {
            corpus_path: self.corpus,
            index_dir: self.index_dir,
            history_dir: self.history_dir,
            session: SessionKey::new(self.session),
            history_enabled: !self.no_history,
            top_k: self.top_k,
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = cli.into_config();
    config.validate()?;

    // Initialize model clients
    let ollama = OllamaClient::from_env()?;
    let embedder = Arc::new(ollama.embedder());
    let llm = ollama.llm();

    let records = load_corpus(&config.corpus_path)?;

    // Open the vector index, building it if this is the first run
    let store = Arc::new(
        LocalVectorStore::open(&config.index_dir, &config.collection)?
            .with_embedding_model(embedder.model_id()),
    );
    let builder = IndexBuilder::new(embedder.clone(), store.clone(), &config.index_dir);
    match builder.ensure_index(&records).await? {
        BuildOutcome::Built { units } => {
            println!("{} Indexed {} reviews", "✅".green(), units)
        }
        BuildOutcome::Skipped { existing } => {
            tracing::info!(existing, "using existing index")
        }
    }

    let retriever = VectorRetriever::new(embedder.clone(), store).with_top_k(config.top_k);
    let mut chat = ReviewChat::new(retriever, llm);

    if config.history_enabled {
        let history: Arc<dyn HistoryStore> = Arc::new(FileHistoryStore::new(&config.history_dir)?);
        chat = chat.with_history(history, config.session.clone());
    }

    display_banner(&BannerInfo {
        reviews: records.len(),
        chat_model: chat.model_id().to_string(),
        embed_model: embedder.model_id().to_string(),
        session: chat.has_history().then(|| chat.session().to_string()),
    });

    let mut input = TerminalInput::new();
    let mut stdout = io::stdout();
    let summary = run_loop(&chat, &mut input, &mut stdout)
        .await
        .context("chat loop aborted")?;

    tracing::info!(
        answered = summary.answered,
        failed = summary.failed,
        "session finished"
    );
    Ok(())
}
