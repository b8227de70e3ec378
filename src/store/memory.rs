//! In-memory vector store used by tests and offline runs

use super::{ChunkPayload, ChunkRecord, StoreHit, VectorStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Cosine similarity between two vectors, 0.0 when either norm is zero
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Map-backed store with the same upsert semantics as the Qdrant backend
pub struct MemoryStore {
    collection: String,
    records: Mutex<HashMap<String, ChunkRecord>>,
}

impl MemoryStore {
    pub fn new(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            records: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn ensure_collection(&self) -> Result<()> {
        Ok(())
    }

    async fn upsert(&self, records: Vec<ChunkRecord>) -> Result<()> {
        let mut map = self.records.lock().unwrap();
        for record in records {
            map.insert(record.id.clone(), record);
        }
        Ok(())
    }

    async fn search(&self, vector: Vec<f32>, limit: usize) -> Result<Vec<StoreHit>> {
        let map = self.records.lock().unwrap();
        let mut hits: Vec<StoreHit> = map
            .values()
            .map(|record| StoreHit {
                payload: record.payload.clone(),
                distance: Some(1.0 - cosine_similarity(&record.vector, &vector)),
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);
        Ok(hits)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.records.lock().unwrap().len() as u64)
    }

    async fn list_payloads(&self) -> Result<Vec<ChunkPayload>> {
        let map = self.records.lock().unwrap();
        Ok(map.values().map(|r| r.payload.clone()).collect())
    }

    async fn delete_collection(&self) -> Result<bool> {
        let mut map = self.records.lock().unwrap();
        let existed = !map.is_empty();
        map.clear();
        Ok(existed)
    }

    fn collection_name(&self) -> &str {
        &self.collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn record(id: &str, vector: Vec<f32>) -> ChunkRecord {
        ChunkRecord {
            id: id.to_string(),
            vector,
            payload: ChunkPayload {
                chunk_id: id.to_string(),
                filename: "doc.txt".to_string(),
                chunk_index: 0,
                total_chunks: 1,
                text: format!("text of {id}"),
                extra: Map::new(),
            },
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let store = MemoryStore::new("test");
        store.upsert(vec![record("a_0", vec![1.0, 0.0])]).await.unwrap();
        store.upsert(vec![record("a_0", vec![0.0, 1.0])]).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_search_orders_closest_first() {
        let store = MemoryStore::new("test");
        store
            .upsert(vec![
                record("a_0", vec![1.0, 0.0]),
                record("b_0", vec![0.0, 1.0]),
                record("c_0", vec![0.7, 0.7]),
            ])
            .await
            .unwrap();

        let hits = store.search(vec![1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].payload.chunk_id, "a_0");
        assert_eq!(hits[1].payload.chunk_id, "c_0");
        assert!(hits[0].distance.unwrap() < hits[1].distance.unwrap());
    }

    #[tokio::test]
    async fn test_delete_collection_reports_existence() {
        let store = MemoryStore::new("test");
        assert!(!store.delete_collection().await.unwrap());

        store.upsert(vec![record("a_0", vec![1.0])]).await.unwrap();
        assert!(store.delete_collection().await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
