use kbase_embed::EmbedError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The remote call failed. After retries this is the error from the
    /// final attempt, unchanged.
    #[error(transparent)]
    Remote(EmbedError),

    #[error("encoder: remote returned {got} vectors for a batch of {expected}")]
    BatchMismatch { expected: usize, got: usize },

    #[error("encoder: {0} is not supported by this encoder")]
    Unsupported(&'static str),

    #[error("encoder: empty text at position {index}")]
    EmptyText { index: usize },

    #[error("encoder: invalid configuration: {0}")]
    Config(String),
}

impl From<EmbedError> for EncodeError {
    fn from(err: EmbedError) -> Self {
        match err {
            EmbedError::CountMismatch { expected, got } => {
                EncodeError::BatchMismatch { expected, got }
            }
            other => EncodeError::Remote(other),
        }
    }
}

impl EncodeError {
    /// Returns true if repeating the whole call might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, EncodeError::Remote(e) if e.is_transient())
    }
}
