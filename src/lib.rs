//! docchat - retrieval-augmented chat over local documents
//!
//! Pipeline: document loaders extract text, the chunker splits it into
//! token-bounded overlapping chunks, the indexer embeds chunks and writes
//! them to a vector store, and the chat layer grounds generated answers in
//! retrieved chunks while keeping multi-turn history.

pub mod chat;
pub mod chunk;
pub mod commands;
pub mod config;
pub mod error;
pub mod index;
pub mod load;
pub mod provider;
pub mod store;

pub use error::{Error, Result};
