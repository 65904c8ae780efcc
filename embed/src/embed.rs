use crate::error::EmbedError;

/// Embedder converts text into dense float32 vectors.
///
/// Calls block the current thread for the full network round-trip.
/// Implementations must be safe for concurrent use (Send + Sync).
pub trait Embedder: Send + Sync {
    /// Return one vector per text, in input order.
    /// Implementations may split large inputs into several API calls.
    fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError>;

    /// Return one vector per query text, in input order.
    ///
    /// Symmetric models use the same space for documents and queries, which
    /// is the default. Models with a separate query space override this.
    fn embed_queries(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        self.embed_documents(texts)
    }

    /// Return the embedding vector for a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        if text.is_empty() {
            return Err(EmbedError::EmptyInput);
        }
        self.embed_documents(&[text])?
            .into_iter()
            .next()
            .ok_or(EmbedError::MissingIndex(0))
    }

    /// Return the dimensionality of the output vectors.
    fn dimension(&self) -> usize;
}
