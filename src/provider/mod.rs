//! Model provider abstractions
//!
//! This module defines the capability traits the pipeline is written
//! against:
//! - [`Embedder`] turns text into fixed-dimension vectors
//! - [`Generator`] produces a chat completion from an ordered message list
//!
//! Both are implemented by [`OpenAiClient`] for OpenAI-compatible APIs, and
//! by in-memory fakes in tests so the core runs without network access.

mod openai;

pub use openai::*;

use crate::error::Result;
use async_trait::async_trait;

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// One message in a chat completion request
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Sampling parameters for a generation call
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Trait for embedding providers
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Get the embedding dimension
    fn dimension(&self) -> usize;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Trait for chat completion providers
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce a completion for the given ordered messages
    async fn complete(&self, messages: &[ChatMessage], params: &GenerationParams)
        -> Result<String>;
}
