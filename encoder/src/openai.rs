use kbase_embed::{EmbedConfig, OpenAI};
use kbase_retry::RetryPolicy;

use crate::dense::{DEFAULT_BATCH_SIZE, DenseRecordEncoder};
use crate::encoder::RecordEncoder;
use crate::error::EncodeError;
use crate::models::{Chunk, EncodedChunk, EncodedQuery, Query};

/// Environment variable consulted when no API key is configured.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// OpenAIRecordEncoder is a dense record encoder backed by the OpenAI
/// embeddings endpoint.
///
/// Documents and queries are embedded the same way; callers that need a
/// separate query space must use a different encoder.
pub struct OpenAIRecordEncoder {
    inner: DenseRecordEncoder,
}

impl OpenAIRecordEncoder {
    /// `text-embedding-ada-002`, batches of 100.
    pub fn new(api_key: &str) -> Result<Self, EncodeError> {
        Self::with_config(api_key, EmbedConfig::default(), DEFAULT_BATCH_SIZE)
    }

    pub fn with_config(
        api_key: &str,
        cfg: EmbedConfig,
        batch_size: usize,
    ) -> Result<Self, EncodeError> {
        if api_key.is_empty() {
            return Err(EncodeError::Config("OpenAI API key is empty".into()));
        }
        let embedder = OpenAI::with_config(api_key, cfg);
        Ok(Self {
            inner: DenseRecordEncoder::new(embedder, batch_size)?,
        })
    }

    /// Build with the key from `OPENAI_API_KEY`.
    pub fn from_env(cfg: EmbedConfig, batch_size: usize) -> Result<Self, EncodeError> {
        let api_key = std::env::var(OPENAI_API_KEY_ENV)
            .map_err(|_| EncodeError::Config(format!("{OPENAI_API_KEY_ENV} is not set")))?;
        Self::with_config(&api_key, cfg, batch_size)
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.inner = self.inner.with_retry(retry);
        self
    }
}

#[async_trait::async_trait]
impl RecordEncoder for OpenAIRecordEncoder {
    fn batch_size(&self) -> usize {
        self.inner.batch_size()
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn encode_documents_batch(&self, chunks: &[Chunk]) -> Result<Vec<EncodedChunk>, EncodeError> {
        self.inner.encode_documents_batch(chunks)
    }

    fn encode_queries_batch(&self, queries: &[Query]) -> Result<Vec<EncodedQuery>, EncodeError> {
        self.inner.encode_queries_batch(queries)
    }

    fn encode_documents(&self, chunks: &[Chunk]) -> Result<Vec<EncodedChunk>, EncodeError> {
        self.inner.encode_documents(chunks)
    }

    fn encode_queries(&self, queries: &[Query]) -> Result<Vec<EncodedQuery>, EncodeError> {
        self.inner.encode_queries(queries)
    }
}
