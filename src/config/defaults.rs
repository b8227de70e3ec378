//! Default values for configuration

/// Default Qdrant gRPC URL for local development (port 6334, not 6333 REST)
pub fn default_qdrant_url() -> String {
    std::env::var("QDRANT_URL").unwrap_or_else(|_| "http://127.0.0.1:6334".to_string())
}

/// Default collection name
pub fn default_collection_name() -> String {
    "documents".to_string()
}

/// Default environment variable holding the OpenAI API key
pub fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

/// Default OpenAI-compatible API base URL
pub fn default_api_base_url() -> String {
    std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com".to_string())
}

/// Default embedding model
pub fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

/// Default embedding dimension (text-embedding-3-small)
pub fn default_embedding_dimension() -> usize {
    1536
}

/// Default chat completion model
pub fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

/// Default sampling temperature for grounded answers
pub fn default_temperature() -> f32 {
    0.3
}

/// Default output-length ceiling for answers
pub fn default_max_output_tokens() -> u32 {
    1000
}

/// Default request timeout in seconds
pub fn default_request_timeout() -> u64 {
    60
}

/// Default maximum tokens per chunk
pub fn default_chunk_max_tokens() -> usize {
    512
}

/// Default overlap between consecutive chunks, in words
pub fn default_chunk_overlap_words() -> usize {
    50
}

/// Default number of prior turns included in each prompt
pub fn default_max_history() -> usize {
    5
}

/// Default number of retrieved chunks per query
pub fn default_top_k() -> usize {
    3
}

/// Default sampling temperature for question suggestions
pub fn default_suggest_temperature() -> f32 {
    0.5
}

/// Default output-length ceiling for question suggestions
pub fn default_suggest_max_tokens() -> u32 {
    200
}
