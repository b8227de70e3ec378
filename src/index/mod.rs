//! Document indexing and retrieval
//!
//! [`DocumentIndexer`] owns the ingest path (chunk, embed, upsert) and the
//! query path (embed, nearest-neighbor search). The query path never fails:
//! degraded results (fewer chunks, empty hit lists, zeroed stats) are
//! preferred over propagating provider or store errors to the conversation
//! layer.

use crate::chunk::Chunker;
use crate::provider::Embedder;
use crate::store::{ChunkPayload, ChunkRecord, StoreHit, VectorStore};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// One retrieved chunk
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub content: String,
    pub payload: ChunkPayload,
    /// Cosine distance, lower is closer
    pub distance: Option<f32>,
}

/// Collection statistics
#[derive(Debug, Clone)]
pub struct CollectionInfo {
    pub collection_name: String,
    pub total_chunks: u64,
}

/// Chunk-embed-store pipeline over a vector store
pub struct DocumentIndexer {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    chunker: Chunker,
}

impl DocumentIndexer {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>, chunker: Chunker) -> Self {
        Self {
            embedder,
            store,
            chunker,
        }
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Chunk, embed, and store one document. Returns the number of chunks
    /// actually indexed.
    ///
    /// A chunk whose embedding fails is skipped with a warning; the rest of
    /// the document still goes in. A failed write loses the whole document
    /// and returns 0. Blank content returns 0 without touching the provider.
    pub async fn index_document(
        &self,
        content: &str,
        filename: &str,
        extra: Option<Map<String, Value>>,
    ) -> usize {
        let chunks = self.chunker.split(content);
        if chunks.is_empty() {
            debug!("'{}' produced no chunks, skipping", filename);
            return 0;
        }

        let total_chunks = chunks.len();
        let extra = extra.unwrap_or_default();
        let mut records = Vec::with_capacity(total_chunks);

        for (index, text) in chunks.into_iter().enumerate() {
            let vector = match self.embedder.embed(&text).await {
                Ok(v) => v,
                Err(e) => {
                    warn!("Skipping chunk {} of '{}': {}", index, filename, e);
                    continue;
                }
            };

            let chunk_id = format!("{}_{}", filename, index);
            records.push(ChunkRecord {
                id: chunk_id.clone(),
                vector,
                payload: ChunkPayload {
                    chunk_id,
                    filename: filename.to_string(),
                    chunk_index: index,
                    total_chunks,
                    text,
                    extra: extra.clone(),
                },
            });
        }

        let indexed = records.len();
        if indexed == 0 {
            warn!("No chunks of '{}' could be embedded", filename);
            return 0;
        }

        if let Err(e) = self.store.upsert(records).await {
            warn!("Failed to store chunks of '{}': {}", filename, e);
            return 0;
        }

        debug!("Indexed {}/{} chunks of '{}'", indexed, total_chunks, filename);
        indexed
    }

    /// Retrieve the `top_k` chunks nearest to the query, closest first.
    /// Returns an empty list on any embedding or store failure.
    pub async fn search(&self, query: &str, top_k: usize) -> Vec<SearchResult> {
        let vector = match self.embedder.embed(query).await {
            Ok(v) => v,
            Err(e) => {
                warn!("Query embedding failed: {}", e);
                return Vec::new();
            }
        };

        match self.store.search(vector, top_k).await {
            Ok(hits) => hits.into_iter().map(hit_to_result).collect(),
            Err(e) => {
                warn!("Search failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Collection statistics, zeroed when the store is unreachable
    pub async fn collection_info(&self) -> CollectionInfo {
        let total_chunks = match self.store.count().await {
            Ok(count) => count,
            Err(e) => {
                warn!("Could not read collection info: {}", e);
                0
            }
        };

        CollectionInfo {
            collection_name: self.store.collection_name().to_string(),
            total_chunks,
        }
    }

    /// Distinct indexed filenames, sorted. Empty on failure.
    pub async fn list_documents(&self) -> Vec<String> {
        match self.store.list_payloads().await {
            Ok(payloads) => {
                let names: BTreeSet<String> =
                    payloads.into_iter().map(|p| p.filename).collect();
                names.into_iter().collect()
            }
            Err(e) => {
                warn!("Could not list documents: {}", e);
                Vec::new()
            }
        }
    }

    /// Drop the whole collection. Returns false if it did not exist or the
    /// store call failed.
    pub async fn delete_collection(&self) -> bool {
        match self.store.delete_collection().await {
            Ok(existed) => existed,
            Err(e) => {
                warn!("Could not delete collection: {}", e);
                false
            }
        }
    }
}

fn hit_to_result(hit: StoreHit) -> SearchResult {
    SearchResult {
        content: hit.payload.text.clone(),
        payload: hit.payload,
        distance: hit.distance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChunkConfig;
    use crate::error::{Error, Result};
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    /// Deterministic embedder: vector derived from text bytes. Texts
    /// containing the poison marker fail.
    struct FakeEmbedder {
        poison: Option<String>,
    }

    impl FakeEmbedder {
        fn new() -> Self {
            Self { poison: None }
        }

        fn poisoned(marker: &str) -> Self {
            Self {
                poison: Some(marker.to_string()),
            }
        }
    }

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if let Some(marker) = &self.poison {
                if text.contains(marker.as_str()) {
                    return Err(Error::Embedding("poisoned chunk".to_string()));
                }
            }
            let sum: u32 = text.bytes().map(u32::from).sum();
            Ok(vec![
                (sum % 101) as f32 / 101.0,
                (text.len() % 53) as f32 / 53.0,
                1.0,
            ])
        }

        fn dimension(&self) -> usize {
            3
        }

        fn model_name(&self) -> &str {
            "fake-embedder"
        }
    }

    /// Store whose every operation fails
    struct BrokenStore;

    #[async_trait]
    impl VectorStore for BrokenStore {
        async fn ensure_collection(&self) -> Result<()> {
            Err(Error::Qdrant("down".to_string()))
        }
        async fn upsert(&self, _records: Vec<ChunkRecord>) -> Result<()> {
            Err(Error::Qdrant("down".to_string()))
        }
        async fn search(&self, _vector: Vec<f32>, _limit: usize) -> Result<Vec<StoreHit>> {
            Err(Error::Qdrant("down".to_string()))
        }
        async fn count(&self) -> Result<u64> {
            Err(Error::Qdrant("down".to_string()))
        }
        async fn list_payloads(&self) -> Result<Vec<ChunkPayload>> {
            Err(Error::Qdrant("down".to_string()))
        }
        async fn delete_collection(&self) -> Result<bool> {
            Err(Error::Qdrant("down".to_string()))
        }
        fn collection_name(&self) -> &str {
            "broken"
        }
    }

    fn indexer_with(embedder: FakeEmbedder, store: Arc<dyn VectorStore>) -> DocumentIndexer {
        let chunker = Chunker::new(&ChunkConfig {
            max_tokens: 16,
            overlap_words: 2,
        })
        .unwrap();
        DocumentIndexer::new(Arc::new(embedder), store, chunker)
    }

    #[tokio::test]
    async fn test_index_and_search_roundtrip() {
        let store = Arc::new(MemoryStore::new("documents"));
        let indexer = indexer_with(FakeEmbedder::new(), store.clone());

        let text = "alpha beta gamma delta epsilon zeta eta theta ".repeat(8);
        let indexed = indexer.index_document(&text, "greek.txt", None).await;
        assert!(indexed > 1);
        assert_eq!(store.count().await.unwrap(), indexed as u64);

        let payloads = store.list_payloads().await.unwrap();
        for payload in &payloads {
            assert_eq!(payload.filename, "greek.txt");
            assert_eq!(payload.total_chunks, indexed);
            assert_eq!(
                payload.chunk_id,
                format!("greek.txt_{}", payload.chunk_index)
            );
        }

        let results = indexer.search("alpha beta gamma", 2).await;
        assert_eq!(results.len(), 2);
        assert!(!results[0].content.is_empty());
    }

    #[tokio::test]
    async fn test_blank_content_indexes_nothing() {
        let store = Arc::new(MemoryStore::new("documents"));
        let indexer = indexer_with(FakeEmbedder::new(), store.clone());

        assert_eq!(indexer.index_document("", "empty.txt", None).await, 0);
        assert_eq!(indexer.index_document("  \n  ", "blank.txt", None).await, 0);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_embedding_failure_skips_only_that_chunk() {
        let store = Arc::new(MemoryStore::new("documents"));
        // Poison one word so exactly one chunk fails to embed
        let indexer = indexer_with(FakeEmbedder::poisoned("POISONWORD"), store.clone());

        let mut text = "one two three four five six seven eight nine ten ".repeat(4);
        text.push_str("POISONWORD ");
        text.push_str(&"eleven twelve thirteen fourteen fifteen sixteen ".repeat(4));

        let chunker = Chunker::new(&ChunkConfig {
            max_tokens: 16,
            overlap_words: 2,
        })
        .unwrap();
        let total = chunker.split(&text).len();

        let indexed = indexer.index_document(&text, "doc.txt", None).await;
        // Overlap may carry the marker into one neighboring chunk
        assert!(indexed < total);
        assert!(indexed >= total - 2);
        assert_eq!(store.count().await.unwrap(), indexed as u64);
    }

    #[tokio::test]
    async fn test_store_failure_reports_zero() {
        let indexer = indexer_with(FakeEmbedder::new(), Arc::new(BrokenStore));
        let indexed = indexer.index_document("some words here", "doc.txt", None).await;
        assert_eq!(indexed, 0);
    }

    #[tokio::test]
    async fn test_search_failures_yield_empty_results() {
        // Broken store
        let indexer = indexer_with(FakeEmbedder::new(), Arc::new(BrokenStore));
        assert!(indexer.search("anything", 3).await.is_empty());

        // Broken embedder
        let store = Arc::new(MemoryStore::new("documents"));
        let indexer = indexer_with(FakeEmbedder::poisoned("anything"), store);
        assert!(indexer.search("anything", 3).await.is_empty());
    }

    #[tokio::test]
    async fn test_metadata_merged_into_payload() {
        let store = Arc::new(MemoryStore::new("documents"));
        let indexer = indexer_with(FakeEmbedder::new(), store.clone());

        let mut extra = Map::new();
        extra.insert("kind".to_string(), Value::String("text".to_string()));
        indexer
            .index_document("a few words", "doc.txt", Some(extra))
            .await;

        let payloads = store.list_payloads().await.unwrap();
        assert_eq!(payloads[0].extra["kind"], Value::String("text".to_string()));
    }

    #[tokio::test]
    async fn test_list_documents_dedups_and_sorts() {
        let store = Arc::new(MemoryStore::new("documents"));
        let indexer = indexer_with(FakeEmbedder::new(), store);

        indexer.index_document("words in b", "b.txt", None).await;
        indexer.index_document("words in a", "a.txt", None).await;
        indexer.index_document("more words for a", "a.txt", None).await;

        assert_eq!(
            indexer.list_documents().await,
            vec!["a.txt".to_string(), "b.txt".to_string()]
        );
    }

    #[tokio::test]
    async fn test_collection_info_zeroed_on_failure() {
        let indexer = indexer_with(FakeEmbedder::new(), Arc::new(BrokenStore));
        let info = indexer.collection_info().await;
        assert_eq!(info.total_chunks, 0);
        assert_eq!(info.collection_name, "broken");
        assert!(!indexer.delete_collection().await);
    }
}
