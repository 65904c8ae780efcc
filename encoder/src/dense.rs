use std::sync::Arc;

use kbase_embed::{EmbedError, Embedder};
use kbase_retry::RetryPolicy;
use tracing::debug;

use crate::encoder::{RecordEncoder, encode_in_batches};
use crate::error::EncodeError;
use crate::models::{Chunk, EncodedChunk, EncodedQuery, Query};

/// Default number of records per remote call.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// DenseRecordEncoder attaches dense vectors from an [`Embedder`].
///
/// Each batch is one embedder call, retried under the configured policy when
/// the embedder reports a transient failure. Calls block; batches run one
/// after another. The sparse representation is always left unset.
pub struct DenseRecordEncoder {
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
    retry: RetryPolicy,
}

impl DenseRecordEncoder {
    pub fn new(embedder: impl Embedder + 'static, batch_size: usize) -> Result<Self, EncodeError> {
        Self::from_shared(Arc::new(embedder), batch_size)
    }

    pub fn from_shared(embedder: Arc<dyn Embedder>, batch_size: usize) -> Result<Self, EncodeError> {
        if batch_size == 0 {
            return Err(EncodeError::Config("batch_size must be at least 1".into()));
        }
        Ok(Self {
            embedder,
            batch_size,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    fn embed_batch(&self, texts: &[&str], queries: bool) -> Result<Vec<Vec<f32>>, EncodeError> {
        debug!(batch = texts.len(), queries, "encoder: embedding batch");
        let vectors = self.retry.run(
            || {
                if queries {
                    self.embedder.embed_queries(texts)
                } else {
                    self.embedder.embed_documents(texts)
                }
            },
            EmbedError::is_transient,
        )?;
        if vectors.len() != texts.len() {
            return Err(EncodeError::BatchMismatch {
                expected: texts.len(),
                got: vectors.len(),
            });
        }
        Ok(vectors)
    }
}

/// Reject empty texts before anything goes over the network.
fn check_texts<'a>(texts: impl Iterator<Item = &'a str>) -> Result<(), EncodeError> {
    for (index, text) in texts.enumerate() {
        if text.is_empty() {
            return Err(EncodeError::EmptyText { index });
        }
    }
    Ok(())
}

#[async_trait::async_trait]
impl RecordEncoder for DenseRecordEncoder {
    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn dimension(&self) -> usize {
        self.embedder.dimension()
    }

    fn encode_documents_batch(&self, chunks: &[Chunk]) -> Result<Vec<EncodedChunk>, EncodeError> {
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let vectors = self.embed_batch(&texts, false)?;
        Ok(chunks
            .iter()
            .cloned()
            .zip(vectors)
            .map(|(chunk, values)| EncodedChunk::dense(chunk, values))
            .collect())
    }

    fn encode_queries_batch(&self, queries: &[Query]) -> Result<Vec<EncodedQuery>, EncodeError> {
        let texts: Vec<&str> = queries.iter().map(|q| q.text.as_str()).collect();
        let vectors = self.embed_batch(&texts, true)?;
        Ok(queries
            .iter()
            .cloned()
            .zip(vectors)
            .map(|(query, values)| EncodedQuery::dense(query, values))
            .collect())
    }

    fn encode_documents(&self, chunks: &[Chunk]) -> Result<Vec<EncodedChunk>, EncodeError> {
        check_texts(chunks.iter().map(|c| c.text.as_str()))?;
        encode_in_batches(chunks, self.batch_size, |batch| {
            self.encode_documents_batch(batch)
        })
    }

    fn encode_queries(&self, queries: &[Query]) -> Result<Vec<EncodedQuery>, EncodeError> {
        check_texts(queries.iter().map(|q| q.text.as_str()))?;
        encode_in_batches(queries, self.batch_size, |batch| {
            self.encode_queries_batch(batch)
        })
    }
}
