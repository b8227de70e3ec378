//! Grounded conversation over indexed documents
//!
//! [`RagChat`] drives the retrieve-then-generate loop: each query pulls the
//! nearest chunks from the index, builds a prompt that carries the system
//! instructions, a bounded window of prior turns, and the retrieved context,
//! and asks the generator for an answer. Generation failures are folded into
//! the returned text so a conversation never aborts mid-session.

use crate::config::Config;
use crate::index::DocumentIndexer;
use crate::provider::{ChatMessage, GenerationParams, Generator};
use chrono::Local;
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, warn};

const SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions using the \
provided document context. Follow these rules:\n\
- Base your answers only on the provided context.\n\
- If the context does not contain the answer, say so instead of guessing.\n\
- Mention the source filename when it helps the reader.\n\
- Keep answers concise and specific.\n\
- When a question spans several documents, synthesize across them.";

const NO_CONTEXT: &str = "No relevant documents found.";

const NO_DOCS_SUGGESTION: &str =
    "No documents have been indexed yet. Ingest some documents first.";

const FALLBACK_SUGGESTIONS: [&str; 3] = [
    "What topics do these documents cover?",
    "Can you summarize the main points of the documents?",
    "What are the key findings in the documents?",
];

/// One completed exchange
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub query: String,
    pub response: String,
    /// Distinct source filenames behind the answer, retrieval order
    pub relevant_docs: Vec<String>,
    pub timestamp: String,
}

/// Snapshot of a conversation
#[derive(Debug, Clone)]
pub struct ConversationSummary {
    pub total_exchanges: usize,
    pub last_query: Option<String>,
    /// Distinct filenames referenced anywhere in the conversation, sorted
    pub documents_referenced: Vec<String>,
}

/// Retrieval-augmented chat session
pub struct RagChat {
    indexer: DocumentIndexer,
    generator: Arc<dyn Generator>,
    answer_params: GenerationParams,
    suggest_params: GenerationParams,
    max_history: usize,
    top_k: usize,
    history: Vec<ConversationTurn>,
}

impl RagChat {
    pub fn new(indexer: DocumentIndexer, generator: Arc<dyn Generator>, config: &Config) -> Self {
        Self {
            indexer,
            generator,
            answer_params: GenerationParams {
                model: config.openai.chat_model.clone(),
                temperature: config.openai.temperature,
                max_output_tokens: config.openai.max_output_tokens,
            },
            suggest_params: GenerationParams {
                model: config.openai.chat_model.clone(),
                temperature: config.chat.suggest_temperature,
                max_output_tokens: config.chat.suggest_max_tokens,
            },
            max_history: config.chat.max_history,
            top_k: config.chat.top_k,
            history: Vec::new(),
        }
    }

    pub fn indexer(&self) -> &DocumentIndexer {
        &self.indexer
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    /// Answer a query grounded in the indexed documents.
    ///
    /// Always returns text. On generation failure the error is rendered into
    /// the reply and the failed exchange is not recorded, so history holds
    /// only real question-answer pairs.
    pub async fn generate_response(&mut self, query: &str) -> String {
        let results = self.indexer.search(query, self.top_k).await;

        let mut relevant_docs: Vec<String> = Vec::new();
        for result in &results {
            if !relevant_docs.contains(&result.payload.filename) {
                relevant_docs.push(result.payload.filename.clone());
            }
        }

        let context = if results.is_empty() {
            NO_CONTEXT.to_string()
        } else {
            results
                .iter()
                .map(|r| {
                    format!(
                        "Document: {}\nContent: {}\n---",
                        r.payload.filename, r.content
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        let mut messages = vec![ChatMessage::system(SYSTEM_PROMPT)];
        let window_start = self.history.len().saturating_sub(self.max_history);
        for turn in &self.history[window_start..] {
            messages.push(ChatMessage::user(&turn.query));
            messages.push(ChatMessage::assistant(&turn.response));
        }
        messages.push(ChatMessage::user(format!(
            "Document context:\n{context}\n\nQuestion: {query}"
        )));

        debug!(
            "Generating answer ({} context chunks, {} history turns)",
            results.len(),
            self.history.len().min(self.max_history)
        );

        match self.generator.complete(&messages, &self.answer_params).await {
            Ok(response) => {
                self.history.push(ConversationTurn {
                    query: query.to_string(),
                    response: response.clone(),
                    relevant_docs,
                    timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                });
                response
            }
            Err(e) => {
                warn!("Generation failed: {}", e);
                format!("Sorry, there was an error generating the response: {e}")
            }
        }
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn summary(&self) -> ConversationSummary {
        let documents_referenced: BTreeSet<String> = self
            .history
            .iter()
            .flat_map(|turn| turn.relevant_docs.iter().cloned())
            .collect();

        ConversationSummary {
            total_exchanges: self.history.len(),
            last_query: self.history.last().map(|turn| turn.query.clone()),
            documents_referenced: documents_referenced.into_iter().collect(),
        }
    }

    /// Render the conversation as a plain-text transcript
    pub fn export(&self) -> String {
        if self.history.is_empty() {
            return "No conversation to export.".to_string();
        }

        let mut out = format!(
            "Conversation export ({} exchanges)\n",
            self.history.len()
        );

        for (i, turn) in self.history.iter().enumerate() {
            let _ = write!(
                out,
                "\n[{}] {}\nQ: {}\nA: {}\n",
                i + 1,
                turn.timestamp,
                turn.query,
                turn.response
            );
            if !turn.relevant_docs.is_empty() {
                let _ = writeln!(out, "Sources: {}", turn.relevant_docs.join(", "));
            }
        }

        out
    }

    /// Suggest up to `count` questions the indexed documents can answer.
    ///
    /// Advisory only: an empty collection or a provider failure yields fixed
    /// fallback suggestions rather than an error.
    pub async fn suggest_questions(&self, count: usize) -> Vec<String> {
        let info = self.indexer.collection_info().await;
        if info.total_chunks == 0 {
            return vec![NO_DOCS_SUGGESTION.to_string()];
        }

        let samples = self.indexer.search("content information", 2).await;
        if samples.is_empty() {
            // Degraded retrieval: nothing to ground the suggestions on
            return FALLBACK_SUGGESTIONS.iter().map(|s| s.to_string()).collect();
        }
        let snippets = samples
            .iter()
            .map(|r| {
                let snippet: String = r.content.chars().take(200).collect();
                format!("From {}: {}", r.payload.filename, snippet)
            })
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "Based on these document excerpts, suggest {count} specific questions a reader \
             might ask about the content. Write one question per line, nothing else.\n\n\
             {snippets}"
        );
        let messages = vec![ChatMessage::user(prompt)];

        match self.generator.complete(&messages, &self.suggest_params).await {
            Ok(text) => {
                let questions: Vec<String> = text
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .take(count)
                    .collect();

                if questions.is_empty() {
                    FALLBACK_SUGGESTIONS.iter().map(|s| s.to_string()).collect()
                } else {
                    questions
                }
            }
            Err(e) => {
                warn!("Suggestion generation failed: {}", e);
                FALLBACK_SUGGESTIONS.iter().map(|s| s.to_string()).collect()
            }
        }
    }
}
