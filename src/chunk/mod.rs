//! Token-budget text chunking with word overlap
//!
//! Splits document text into whitespace-delimited words and accumulates them
//! into chunks that respect a token budget measured with a deterministic BPE
//! tokenizer (cl100k_base). Consecutive chunks share a configurable number of
//! trailing/leading words so context survives chunk boundaries.

use crate::config::ChunkConfig;
use crate::error::{Error, Result};
use tiktoken_rs::{cl100k_base, CoreBPE};

/// Word-based chunker with a BPE token budget
pub struct Chunker {
    bpe: CoreBPE,
    max_tokens: usize,
    overlap_words: usize,
}

impl Chunker {
    /// Create a chunker, loading the cl100k_base encoding once
    pub fn new(config: &ChunkConfig) -> Result<Self> {
        if config.max_tokens == 0 {
            return Err(Error::Config(
                "chunk.max_tokens must be greater than zero".to_string(),
            ));
        }
        let bpe = cl100k_base()?;
        Ok(Self {
            bpe,
            max_tokens: config.max_tokens,
            overlap_words: config.overlap_words,
        })
    }

    /// Count BPE tokens in a text
    pub fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    /// Split text into overlapping, token-bounded chunks.
    ///
    /// Words are accumulated while the running token count stays within the
    /// budget. When the next word would overflow a non-empty chunk, the chunk
    /// is closed and a new one starts seeded with the last `overlap_words`
    /// words of the closed chunk plus the overflowing word. A single word
    /// that alone exceeds the budget is kept anyway; content is never
    /// dropped. Empty or whitespace-only input yields no chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_tokens = 0usize;

        for word in words {
            let word_tokens = self.count_tokens(&format!("{} ", word));

            if current_tokens + word_tokens > self.max_tokens && !current.is_empty() {
                chunks.push(current.join(" "));

                let overlap_start = current.len().saturating_sub(self.overlap_words);
                let mut seeded: Vec<&str> = current[overlap_start..].to_vec();
                seeded.push(word);
                current_tokens = self.count_tokens(&seeded.join(" "));
                current = seeded;
            } else {
                current.push(word);
                current_tokens += word_tokens;
            }
        }

        if !current.is_empty() {
            chunks.push(current.join(" "));
        }

        chunks
    }
}
