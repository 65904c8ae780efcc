use std::time::Duration;

use ureq::Agent;

use crate::config::EmbedConfig;
use crate::embed::Embedder;
use crate::error::EmbedError;

/// OpenAI embedding models.
pub const MODEL_OPENAI_ADA_002: &str = "text-embedding-ada-002";
pub const MODEL_OPENAI_3_SMALL: &str = "text-embedding-3-small";
pub const MODEL_OPENAI_3_LARGE: &str = "text-embedding-3-large";

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENAI_MAX_BATCH: usize = 2048;
const OPENAI_DEFAULT_DIM: usize = 1536;
const OPENAI_DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Native output size of the known OpenAI models.
pub fn default_dimension(model: &str) -> usize {
    match model {
        MODEL_OPENAI_3_LARGE => 3072,
        _ => OPENAI_DEFAULT_DIM,
    }
}

/// OpenAI embedder using the OpenAI embeddings API.
///
/// Also works with any OpenAI-compatible provider via `with_config` and
/// `EmbedConfig::with_base_url`. Requests are blocking and bounded by the
/// configured timeout.
pub struct OpenAI {
    agent: Agent,
    api_key: String,
    model: String,
    dim: usize,
    // Only sent when configured; ada-002 rejects the parameter.
    requested_dim: Option<usize>,
    base_url: String,
}

impl OpenAI {
    pub fn new(api_key: &str) -> Self {
        Self::with_config(api_key, EmbedConfig::default())
    }

    pub fn with_config(api_key: &str, cfg: EmbedConfig) -> Self {
        let model = if cfg.model.is_empty() {
            MODEL_OPENAI_ADA_002.to_string()
        } else {
            cfg.model
        };
        let requested_dim = (cfg.dimension != 0).then_some(cfg.dimension);
        Self {
            agent: crate::openai_compat::new_agent(cfg.timeout.unwrap_or(OPENAI_DEFAULT_TIMEOUT)),
            api_key: api_key.to_string(),
            dim: requested_dim.unwrap_or_else(|| default_dimension(&model)),
            model,
            requested_dim,
            base_url: if cfg.base_url.is_empty() {
                OPENAI_BASE_URL.to_string()
            } else {
                cfg.base_url
            },
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn call_api(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        crate::openai_compat::call_embedding_api(
            &self.agent,
            &self.api_key,
            &self.base_url,
            &self.model,
            self.requested_dim,
            texts,
        )
    }
}

impl Embedder for OpenAI {
    fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Err(EmbedError::EmptyInput);
        }

        let mut result = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(OPENAI_MAX_BATCH) {
            let vecs = self.call_api(chunk)?;
            result.extend(vecs);
        }
        Ok(result)
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let e = OpenAI::new("sk-test");
        assert_eq!(e.model(), MODEL_OPENAI_ADA_002);
        assert_eq!(e.dimension(), 1536);
        assert_eq!(e.requested_dim, None);
        assert_eq!(e.base_url, OPENAI_BASE_URL);
    }

    #[test]
    fn test_config_overrides() {
        let cfg = EmbedConfig::default()
            .with_model(MODEL_OPENAI_3_LARGE)
            .with_base_url("http://localhost:8080/v1/");
        let e = OpenAI::with_config("sk-test", cfg);
        assert_eq!(e.dimension(), 3072);
        assert_eq!(e.base_url, "http://localhost:8080/v1");

        let e = OpenAI::with_config(
            "sk-test",
            EmbedConfig::default()
                .with_model(MODEL_OPENAI_3_SMALL)
                .with_dimension(256),
        );
        assert_eq!(e.dimension(), 256);
        assert_eq!(e.requested_dim, Some(256));
    }

    #[test]
    fn test_empty_input_makes_no_call() {
        // Unroutable base URL: any request would fail with a transport error.
        let e = OpenAI::with_config("sk-test", EmbedConfig::default().with_base_url("http://0.0.0.0:1"));
        assert_eq!(e.embed_documents(&[]), Err(EmbedError::EmptyInput));
        assert_eq!(e.embed(""), Err(EmbedError::EmptyInput));
    }
}
