//! Payload schema for stored chunks

use qdrant_client::qdrant::{PointStruct, Value as QdrantValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

/// Derive a stable point UUID from a chunk id string.
///
/// The same `"{filename}_{index}"` id always maps to the same UUID, so
/// re-indexing a document overwrites its existing points instead of
/// accumulating duplicates.
pub fn point_uuid(chunk_id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, chunk_id.as_bytes())
}

/// A record ready to be written to the vector store
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    /// Chunk id of the form `"{filename}_{index}"`
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: ChunkPayload,
}

impl ChunkRecord {
    /// Convert to a qdrant-client PointStruct
    pub fn to_point_struct(self) -> PointStruct {
        let payload_map = self.payload.to_qdrant_payload();
        PointStruct::new(point_uuid(&self.id).to_string(), self.vector, payload_map)
    }
}

/// Payload stored with each chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkPayload {
    /// Chunk id, `"{filename}_{index}"`
    pub chunk_id: String,

    /// Owning document filename
    pub filename: String,

    /// Chunk ordinal within the document
    pub chunk_index: usize,

    /// Total chunks produced for the document
    pub total_chunks: usize,

    /// Raw chunk text
    pub text: String,

    /// Caller-supplied document metadata
    #[serde(default)]
    pub extra: Map<String, Value>,
}

impl ChunkPayload {
    /// Convert to qdrant payload values
    pub fn to_qdrant_payload(self) -> HashMap<String, QdrantValue> {
        let mut map = HashMap::new();

        map.insert("chunk_id".to_string(), json_to_qdrant_value(Value::String(self.chunk_id)));
        map.insert("filename".to_string(), json_to_qdrant_value(Value::String(self.filename)));
        map.insert(
            "chunk_index".to_string(),
            json_to_qdrant_value(Value::Number((self.chunk_index as i64).into())),
        );
        map.insert(
            "total_chunks".to_string(),
            json_to_qdrant_value(Value::Number((self.total_chunks as i64).into())),
        );
        map.insert("text".to_string(), json_to_qdrant_value(Value::String(self.text)));

        for (key, value) in self.extra {
            // Core fields win on name collision
            map.entry(key).or_insert_with(|| json_to_qdrant_value(value));
        }

        map
    }

    /// Rebuild a payload from qdrant payload values
    pub fn from_qdrant_payload(payload: HashMap<String, QdrantValue>) -> Self {
        let mut json: Map<String, Value> = payload
            .into_iter()
            .map(|(k, v)| (k, json_from_qdrant_value(v)))
            .collect();

        let take_string = |json: &mut Map<String, Value>, key: &str| {
            json.remove(key)
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default()
        };
        let take_usize = |json: &mut Map<String, Value>, key: &str| {
            json.remove(key)
                .and_then(|v| v.as_u64())
                .unwrap_or_default() as usize
        };

        let chunk_id = take_string(&mut json, "chunk_id");
        let filename = take_string(&mut json, "filename");
        let chunk_index = take_usize(&mut json, "chunk_index");
        let total_chunks = take_usize(&mut json, "total_chunks");
        let text = take_string(&mut json, "text");

        Self {
            chunk_id,
            filename,
            chunk_index,
            total_chunks,
            text,
            extra: json,
        }
    }
}

/// Convert a serde_json value to a qdrant value
pub fn json_to_qdrant_value(v: Value) -> QdrantValue {
    use qdrant_client::qdrant::value::Kind;
    use qdrant_client::qdrant::{ListValue, Struct};

    let kind = match v {
        Value::Null => Kind::NullValue(0),
        Value::Bool(b) => Kind::BoolValue(b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Kind::IntegerValue(i)
            } else {
                Kind::DoubleValue(n.as_f64().unwrap_or(0.0))
            }
        }
        Value::String(s) => Kind::StringValue(s),
        Value::Array(items) => Kind::ListValue(ListValue {
            values: items.into_iter().map(json_to_qdrant_value).collect(),
        }),
        Value::Object(fields) => Kind::StructValue(Struct {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k, json_to_qdrant_value(v)))
                .collect(),
        }),
    };

    QdrantValue { kind: Some(kind) }
}

/// Convert a qdrant value to a serde_json value
pub fn json_from_qdrant_value(v: QdrantValue) -> Value {
    use qdrant_client::qdrant::value::Kind;

    match v.kind {
        Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::IntegerValue(i)) => Value::Number(i.into()),
        Some(Kind::DoubleValue(d)) => serde_json::Number::from_f64(d)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::ListValue(list)) => Value::Array(
            list.values
                .into_iter()
                .map(json_from_qdrant_value)
                .collect(),
        ),
        Some(Kind::StructValue(s)) => Value::Object(
            s.fields
                .into_iter()
                .map(|(k, v)| (k, json_from_qdrant_value(v)))
                .collect(),
        ),
        None => Value::Null,
    }
}
