//! Configuration management for docchat
//!
//! Handles loading and validating configuration from TOML files. Every field
//! has a sensible default so a missing config file is not an error; the only
//! hard startup requirement is the OpenAI API key in the environment.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Qdrant connection URL
    #[serde(default = "default_qdrant_url")]
    pub qdrant_url: String,

    /// Qdrant collection name
    #[serde(default = "default_collection_name")]
    pub collection_name: String,

    /// OpenAI-compatible provider configuration
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Chunking configuration
    #[serde(default)]
    pub chunk: ChunkConfig,

    /// Conversation configuration
    #[serde(default)]
    pub chat: ChatConfig,
}

/// OpenAI-compatible provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Name of the environment variable holding the API key.
    /// The key itself is never written to the config file.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// API base URL (with or without a trailing /v1)
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// Embedding model name
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Embedding dimension (must match the model)
    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,

    /// Chat completion model name
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Sampling temperature for grounded answers
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Output-length ceiling for answers
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

/// Chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Maximum tokens per chunk
    #[serde(default = "default_chunk_max_tokens")]
    pub max_tokens: usize,

    /// Overlap between consecutive chunks, in whitespace-delimited words
    #[serde(default = "default_chunk_overlap_words")]
    pub overlap_words: usize,
}

/// Conversation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Maximum number of prior turns included in each prompt
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Number of retrieved chunks per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Sampling temperature for question suggestions
    #[serde(default = "default_suggest_temperature")]
    pub suggest_temperature: f32,

    /// Output-length ceiling for question suggestions
    #[serde(default = "default_suggest_max_tokens")]
    pub suggest_max_tokens: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            qdrant_url: default_qdrant_url(),
            collection_name: default_collection_name(),
            openai: OpenAiConfig::default(),
            chunk: ChunkConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_api_base_url(),
            embedding_model: default_embedding_model(),
            embedding_dimension: default_embedding_dimension(),
            chat_model: default_chat_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_chunk_max_tokens(),
            overlap_words: default_chunk_overlap_words(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
            top_k: default_top_k(),
            suggest_temperature: default_suggest_temperature(),
            suggest_max_tokens: default_suggest_max_tokens(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the given path, or from the default location,
    /// falling back to defaults if no file exists
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_config_path);

        if config_path.exists() {
            Self::load(&config_path)
        } else {
            debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            Ok(Self::default())
        }
    }

    /// Write the configuration as TOML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default config file path: `<config dir>/docchat/config.toml`
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docchat")
            .join("config.toml")
    }

    /// Resolve the API key from the configured environment variable.
    ///
    /// A missing key is the one fatal startup condition: every other failure
    /// mode degrades, but without credentials neither embedding nor
    /// generation can work at all.
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.openai.api_key_env).map_err(|_| {
            Error::Config(format!(
                "{} is not set in the environment",
                self.openai.api_key_env
            ))
        })
    }
}
