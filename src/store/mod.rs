//! Vector storage
//!
//! [`VectorStore`] is the seam between the pipeline and its persistence
//! backend. [`QdrantStore`] talks to a Qdrant instance over gRPC;
//! [`MemoryStore`] keeps everything in a process-local map and exists so the
//! indexer and chat layers can be tested without a running database.

mod memory;
mod payload;

pub use memory::{cosine_similarity, MemoryStore};
pub use payload::{point_uuid, ChunkPayload, ChunkRecord};

use crate::error::{Error, Result};
use async_trait::async_trait;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, ScrollPointsBuilder, SearchPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use tracing::{debug, info};

/// A single search result from the store
#[derive(Debug, Clone)]
pub struct StoreHit {
    pub payload: ChunkPayload,
    /// Cosine distance, lower is closer. `None` when the backend does not
    /// report a score.
    pub distance: Option<f32>,
}

/// Trait for vector storage backends
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the collection if it does not already exist
    async fn ensure_collection(&self) -> Result<()>;

    /// Write records, replacing any existing points with the same ids
    async fn upsert(&self, records: Vec<ChunkRecord>) -> Result<()>;

    /// Return the `limit` nearest stored chunks, closest first
    async fn search(&self, vector: Vec<f32>, limit: usize) -> Result<Vec<StoreHit>>;

    /// Number of stored chunks
    async fn count(&self) -> Result<u64>;

    /// Payloads of every stored chunk, in no particular order
    async fn list_payloads(&self) -> Result<Vec<ChunkPayload>>;

    /// Drop the collection. Returns false if it did not exist.
    async fn delete_collection(&self) -> Result<bool>;

    /// Name of the backing collection
    fn collection_name(&self) -> &str;
}

/// Qdrant-backed store
pub struct QdrantStore {
    client: Qdrant,
    collection: String,
    dimension: usize,
}

impl QdrantStore {
    /// Connect to a Qdrant instance. The connection is lazy; failures show
    /// up on the first operation, not here.
    pub fn connect(url: &str, collection: &str, dimension: usize) -> Result<Self> {
        debug!("Connecting to Qdrant at {}", url);
        let client = Qdrant::from_url(url).skip_compatibility_check().build()?;
        Ok(Self {
            client,
            collection: collection.to_string(),
            dimension,
        })
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn ensure_collection(&self) -> Result<()> {
        if self.client.collection_exists(&self.collection).await? {
            return Ok(());
        }

        info!(
            "Creating collection '{}' (dimension {})",
            self.collection, self.dimension
        );
        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection).vectors_config(
                    VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine),
                ),
            )
            .await?;
        Ok(())
    }

    async fn upsert(&self, records: Vec<ChunkRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        for record in &records {
            if record.vector.len() != self.dimension {
                return Err(Error::Qdrant(format!(
                    "vector for '{}' has dimension {}, collection expects {}",
                    record.id,
                    record.vector.len(),
                    self.dimension
                )));
            }
        }

        let points = records
            .into_iter()
            .map(ChunkRecord::to_point_struct)
            .collect::<Vec<_>>();

        debug!(
            "Upserting {} points into '{}'",
            points.len(),
            self.collection
        );
        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await?;
        Ok(())
    }

    async fn search(&self, vector: Vec<f32>, limit: usize) -> Result<Vec<StoreHit>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, vector, limit as u64)
                    .with_payload(true),
            )
            .await?;

        let hits = response
            .result
            .into_iter()
            .map(|point| StoreHit {
                payload: ChunkPayload::from_qdrant_payload(point.payload),
                // Qdrant reports cosine similarity, higher is better
                distance: Some(1.0 - point.score),
            })
            .collect();

        Ok(hits)
    }

    async fn count(&self) -> Result<u64> {
        if !self.client.collection_exists(&self.collection).await? {
            return Ok(0);
        }

        let info = self.client.collection_info(&self.collection).await?;
        Ok(info
            .result
            .and_then(|r| r.points_count)
            .unwrap_or_default())
    }

    async fn list_payloads(&self) -> Result<Vec<ChunkPayload>> {
        let mut payloads = Vec::new();
        let mut offset = None;

        loop {
            let mut builder = ScrollPointsBuilder::new(&self.collection)
                .limit(256)
                .with_payload(true);
            if let Some(point_id) = offset {
                builder = builder.offset(point_id);
            }

            let response = self.client.scroll(builder).await?;
            payloads.extend(
                response
                    .result
                    .into_iter()
                    .map(|point| ChunkPayload::from_qdrant_payload(point.payload)),
            );

            match response.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(payloads)
    }

    async fn delete_collection(&self) -> Result<bool> {
        if !self.client.collection_exists(&self.collection).await? {
            return Ok(false);
        }

        info!("Deleting collection '{}'", self.collection);
        self.client.delete_collection(&self.collection).await?;
        Ok(true)
    }

    fn collection_name(&self) -> &str {
        &self.collection
    }
}
