//! Collection inspection and maintenance commands

use crate::chat::RagChat;
use crate::config::Config;
use crate::error::Result;
use crate::index::DocumentIndexer;
use std::io::Write as _;

/// Show collection statistics and active configuration
pub async fn status(indexer: &DocumentIndexer, config: &Config) {
    let info = indexer.collection_info().await;
    let docs = indexer.list_documents().await;

    println!("Collection:      {}", info.collection_name);
    println!("Indexed chunks:  {}", info.total_chunks);
    println!("Documents:       {}", docs.len());
    println!("Qdrant:          {}", config.qdrant_url);
    println!(
        "Embedding model: {} ({} dims)",
        config.openai.embedding_model, config.openai.embedding_dimension
    );
    println!("Chat model:      {}", config.openai.chat_model);
}

/// List distinct indexed documents
pub async fn docs(indexer: &DocumentIndexer) {
    let docs = indexer.list_documents().await;
    if docs.is_empty() {
        println!("No documents indexed.");
        return;
    }
    for doc in docs {
        println!("{doc}");
    }
}

/// Print suggested questions
pub async fn suggest(chat: &RagChat, count: usize) {
    for (i, question) in chat.suggest_questions(count).await.into_iter().enumerate() {
        println!("{}. {}", i + 1, question);
    }
}

/// Drop the collection after confirmation
pub async fn reset(indexer: &DocumentIndexer, yes: bool) -> Result<()> {
    if !yes {
        print!(
            "Delete collection '{}' and all indexed data? [y/N] ",
            indexer.collection_info().await.collection_name
        );
        std::io::stdout().flush()?;

        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            println!("Aborted.");
            return Ok(());
        }
    }

    if indexer.delete_collection().await {
        println!("Collection deleted.");
    } else {
        println!("Nothing to delete.");
    }
    Ok(())
}
