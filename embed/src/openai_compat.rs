use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use ureq::Agent;

use crate::error::EmbedError;

/// OpenAI-compatible embedding request body.
#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
    encoding_format: &'a str,
}

/// OpenAI-compatible embedding response.
#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f64>,
}

/// Error body: `{"error": {"message": ..., "type": ..., "code": ...}}`.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<String>,
}

/// Build a blocking agent that reports HTTP error statuses as responses so
/// the error body can be classified.
pub(crate) fn new_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Call an OpenAI-compatible embedding API endpoint once.
///
/// Returns exactly one vector per input text, ordered by input position.
pub(crate) fn call_embedding_api(
    agent: &Agent,
    api_key: &str,
    base_url: &str,
    model: &str,
    dimensions: Option<usize>,
    texts: &[&str],
) -> Result<Vec<Vec<f32>>, EmbedError> {
    let url = format!("{base_url}/embeddings");
    let body = EmbeddingRequest {
        model,
        input: texts,
        dimensions,
        encoding_format: "float",
    };

    debug!(%url, model, inputs = texts.len(), "embed: requesting embeddings");

    let mut resp = agent
        .post(&url)
        .header("Authorization", format!("Bearer {api_key}"))
        .send_json(&body)
        .map_err(transport_error)?;

    let status = resp.status();
    if !status.is_success() {
        let raw = resp.body_mut().read_to_string().unwrap_or_default();
        return Err(error_from_body(status.as_u16(), &raw));
    }

    let data: EmbeddingResponse = resp.body_mut().read_json().map_err(transport_error)?;
    if data.data.len() != texts.len() {
        return Err(EmbedError::CountMismatch {
            expected: texts.len(),
            got: data.data.len(),
        });
    }

    // Fill results by index (API may return out of order).
    let mut vecs: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
    for item in data.data {
        if item.index >= texts.len() {
            return Err(EmbedError::UnexpectedIndex {
                index: item.index,
                batch_size: texts.len(),
            });
        }
        vecs[item.index] = Some(item.embedding.iter().map(|&v| v as f32).collect());
    }

    vecs.into_iter()
        .enumerate()
        .map(|(i, v)| v.ok_or(EmbedError::MissingIndex(i)))
        .collect()
}

fn error_from_body(status: u16, raw: &str) -> EmbedError {
    match serde_json::from_str::<ErrorEnvelope>(raw) {
        Ok(env) => EmbedError::from_status(status, env.error.code.as_deref(), env.error.message),
        Err(_) => EmbedError::from_status(status, None, raw.to_string()),
    }
}

fn transport_error(err: ureq::Error) -> EmbedError {
    match &err {
        ureq::Error::Timeout(_) => EmbedError::Timeout(err.to_string()),
        ureq::Error::Io(_) | ureq::Error::ConnectionFailed => EmbedError::Connection(err.to_string()),
        ureq::Error::Json(_) => EmbedError::Decode(err.to_string()),
        ureq::Error::StatusCode(status) => EmbedError::from_status(*status, None, err.to_string()),
        _ => EmbedError::Request(err.to_string()),
    }
}
