//! CLI command implementations

pub mod chat;
pub mod ingest;
pub mod status;
