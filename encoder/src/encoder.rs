use crate::error::EncodeError;
use crate::models::{Chunk, EncodedChunk, EncodedQuery, Query};

/// RecordEncoder turns chunks and queries into vector-carrying records.
///
/// Implementors provide the per-batch methods; the provided
/// `encode_documents`/`encode_queries` split the input into consecutive
/// batches of at most [`batch_size`](Self::batch_size) and concatenate the
/// results in input order. Any failing batch fails the whole call.
///
/// The async entry points are a separate capability. Encoders that only
/// block report `supports_async() == false` and fail those calls with
/// [`EncodeError::Unsupported`].
#[async_trait::async_trait]
pub trait RecordEncoder: Send + Sync {
    /// Maximum number of records per remote call.
    fn batch_size(&self) -> usize;

    /// Dimensionality of the dense vectors produced.
    fn dimension(&self) -> usize;

    /// Encode one batch of chunks. Output is positionally aligned with input.
    fn encode_documents_batch(&self, chunks: &[Chunk]) -> Result<Vec<EncodedChunk>, EncodeError>;

    /// Encode one batch of queries. Output is positionally aligned with input.
    fn encode_queries_batch(&self, queries: &[Query]) -> Result<Vec<EncodedQuery>, EncodeError>;

    fn encode_documents(&self, chunks: &[Chunk]) -> Result<Vec<EncodedChunk>, EncodeError> {
        encode_in_batches(chunks, self.batch_size(), |batch| {
            self.encode_documents_batch(batch)
        })
    }

    fn encode_queries(&self, queries: &[Query]) -> Result<Vec<EncodedQuery>, EncodeError> {
        encode_in_batches(queries, self.batch_size(), |batch| {
            self.encode_queries_batch(batch)
        })
    }

    /// Whether the async entry points are implemented.
    fn supports_async(&self) -> bool {
        false
    }

    async fn aencode_documents(&self, _chunks: &[Chunk]) -> Result<Vec<EncodedChunk>, EncodeError> {
        Err(EncodeError::Unsupported("aencode_documents"))
    }

    async fn aencode_queries(&self, _queries: &[Query]) -> Result<Vec<EncodedQuery>, EncodeError> {
        Err(EncodeError::Unsupported("aencode_queries"))
    }
}

/// Run `encode` over consecutive batches of `items`, in order.
///
/// Nothing is returned unless every batch succeeds with a result of the
/// right length. An empty input makes no calls.
pub fn encode_in_batches<I, O, F>(
    items: &[I],
    batch_size: usize,
    mut encode: F,
) -> Result<Vec<O>, EncodeError>
where
    F: FnMut(&[I]) -> Result<Vec<O>, EncodeError>,
{
    let mut out = Vec::with_capacity(items.len());
    for batch in items.chunks(batch_size.max(1)) {
        let encoded = encode(batch)?;
        if encoded.len() != batch.len() {
            return Err(EncodeError::BatchMismatch {
                expected: batch.len(),
                got: encoded.len(),
            });
        }
        out.extend(encoded);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batches_are_consecutive() {
        let items: Vec<u32> = (0..7).collect();
        let mut seen = Vec::new();
        let out = encode_in_batches(&items, 3, |batch| {
            seen.push(batch.to_vec());
            Ok(batch.iter().map(|n| n * 10).collect())
        })
        .unwrap();
        assert_eq!(seen, vec![vec![0, 1, 2], vec![3, 4, 5], vec![6]]);
        assert_eq!(out, vec![0, 10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn test_empty_input_makes_no_calls() {
        let mut calls = 0;
        let out: Vec<u32> = encode_in_batches(&[] as &[u32], 4, |_| {
            calls += 1;
            Ok(vec![])
        })
        .unwrap();
        assert!(out.is_empty());
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_short_batch_is_rejected() {
        let items = [1, 2, 3];
        let err = encode_in_batches(&items, 2, |batch| Ok(batch[..1].to_vec())).unwrap_err();
        assert_eq!(err, EncodeError::BatchMismatch { expected: 2, got: 1 });
    }
}
