use thiserror::Error;

/// Whether a failed remote call is worth repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Expected to succeed if retried: rate limits, timeouts, 5xx.
    Transient,
    /// Will fail again: bad credentials, malformed requests, broken responses.
    Fatal,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmbedError {
    #[error("embed: empty input")]
    EmptyInput,

    #[error("embed: rate limited: {0}")]
    RateLimited(String),

    #[error("embed: request timed out: {0}")]
    Timeout(String),

    #[error("embed: server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("embed: connection failed: {0}")]
    Connection(String),

    #[error("embed: authentication failed (HTTP {status}): {message}")]
    Auth { status: u16, message: String },

    #[error("embed: quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("embed: model not found: {0}")]
    ModelNotFound(String),

    #[error("embed: invalid request (HTTP {status}): {message}")]
    InvalidRequest { status: u16, message: String },

    #[error("embed: malformed response: {0}")]
    Decode(String),

    #[error("embed: request failed: {0}")]
    Request(String),

    #[error("embed: missing embedding for index {0}")]
    MissingIndex(usize),

    #[error("embed: unexpected embedding index {index} for batch size {batch_size}")]
    UnexpectedIndex { index: usize, batch_size: usize },

    #[error("embed: got {got} embeddings for {expected} inputs")]
    CountMismatch { expected: usize, got: usize },
}

/// OpenAI error code for a hard billing limit, sent with HTTP 429.
const CODE_INSUFFICIENT_QUOTA: &str = "insufficient_quota";

impl EmbedError {
    /// Classify a non-success HTTP response.
    ///
    /// `code` is the provider's machine-readable error code, if any.
    pub fn from_status(status: u16, code: Option<&str>, message: String) -> Self {
        match status {
            401 | 403 => EmbedError::Auth { status, message },
            404 => EmbedError::ModelNotFound(message),
            408 => EmbedError::Timeout(message),
            429 if code == Some(CODE_INSUFFICIENT_QUOTA) => EmbedError::QuotaExceeded(message),
            429 => EmbedError::RateLimited(message),
            500..=599 => EmbedError::Server { status, message },
            _ => EmbedError::InvalidRequest { status, message },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EmbedError::RateLimited(_)
            | EmbedError::Timeout(_)
            | EmbedError::Server { .. }
            | EmbedError::Connection(_) => ErrorKind::Transient,
            _ => ErrorKind::Fatal,
        }
    }

    /// Returns true if the call can be retried.
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let msg = || "boom".to_string();
        assert!(EmbedError::from_status(429, None, msg()).is_transient());
        assert!(EmbedError::from_status(408, None, msg()).is_transient());
        assert!(EmbedError::from_status(500, None, msg()).is_transient());
        assert!(EmbedError::from_status(503, Some("overloaded"), msg()).is_transient());

        assert!(!EmbedError::from_status(400, None, msg()).is_transient());
        assert!(!EmbedError::from_status(401, None, msg()).is_transient());
        assert!(!EmbedError::from_status(403, None, msg()).is_transient());
        assert!(!EmbedError::from_status(422, None, msg()).is_transient());
    }

    #[test]
    fn test_quota_is_fatal() {
        let err = EmbedError::from_status(429, Some("insufficient_quota"), "pay up".into());
        assert_eq!(err, EmbedError::QuotaExceeded("pay up".into()));
        assert_eq!(err.kind(), ErrorKind::Fatal);
    }

    #[test]
    fn test_not_found_is_model_not_found() {
        let err = EmbedError::from_status(404, None, "no such model".into());
        assert_eq!(err, EmbedError::ModelNotFound("no such model".into()));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_local_errors_are_fatal() {
        assert!(!EmbedError::EmptyInput.is_transient());
        assert!(!EmbedError::Decode("bad json".into()).is_transient());
        assert!(!EmbedError::CountMismatch { expected: 2, got: 1 }.is_transient());
        assert!(EmbedError::Connection("reset".into()).is_transient());
    }
}
