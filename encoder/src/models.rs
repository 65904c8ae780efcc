use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Chunk is an identified piece of a source document, produced by the
/// ingestion pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,

    /// Content to embed. Must not be empty.
    pub text: String,

    /// Id of the document this chunk was cut from.
    #[serde(default)]
    pub document_id: String,

    /// Where the document came from (URL, path, ...).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl Chunk {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            document_id: String::new(),
            source: String::new(),
            metadata: Map::new(),
        }
    }

    pub fn with_document_id(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = document_id.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// SparseVector maps term indices to weights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub indices: Vec<u32>,
    pub values: Vec<f32>,
}

impl SparseVector {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// EncodedChunk is a chunk ready for the vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedChunk {
    #[serde(flatten)]
    pub chunk: Chunk,

    /// Dense vector. Empty for sparse-only encoders.
    #[serde(default)]
    pub values: Vec<f32>,

    /// Sparse vector. Always `None` from a dense-only encoder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sparse_values: Option<SparseVector>,
}

impl EncodedChunk {
    pub fn dense(chunk: Chunk, values: Vec<f32>) -> Self {
        Self {
            chunk,
            values,
            sparse_values: None,
        }
    }

    /// Whether at least one representation is populated.
    pub fn has_vector(&self) -> bool {
        !self.values.is_empty() || self.sparse_values.as_ref().is_some_and(|s| !s.is_empty())
    }
}

/// Query is a retrieval request as issued by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub text: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_filter: Option<Map<String, Value>>,

    /// Maximum number of results. `None` means the index default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,

    /// Extra parameters passed through to the index.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub query_params: Map<String, Value>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            namespace: String::new(),
            metadata_filter: None,
            top_k: None,
            query_params: Map::new(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_filter(mut self, filter: Map<String, Value>) -> Self {
        self.metadata_filter = Some(filter);
        self
    }
}

/// EncodedQuery is a query ready for the retrieval layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedQuery {
    #[serde(flatten)]
    pub query: Query,

    #[serde(default)]
    pub values: Vec<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sparse_values: Option<SparseVector>,
}

impl EncodedQuery {
    pub fn dense(query: Query, values: Vec<f32>) -> Self {
        Self {
            query,
            values,
            sparse_values: None,
        }
    }

    pub fn has_vector(&self) -> bool {
        !self.values.is_empty() || self.sparse_values.as_ref().is_some_and(|s| !s.is_empty())
    }
}
