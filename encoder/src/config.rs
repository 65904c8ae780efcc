//! Encoder configuration, usually loaded from a YAML file:
//!
//! ```yaml
//! type: openai
//! model_name: text-embedding-3-small
//! batch_size: 64
//! retry:
//!   max_attempts: 3
//!   max_wait_secs: 10
//! ```

use std::path::Path;
use std::time::Duration;

use kbase_embed::EmbedConfig;
use kbase_embed::openai::MODEL_OPENAI_ADA_002;
use kbase_retry::{Backoff, RetryPolicy};
use serde::{Deserialize, Serialize};

use crate::dense::DEFAULT_BATCH_SIZE;
use crate::encoder::RecordEncoder;
use crate::error::EncodeError;
use crate::openai::{OPENAI_API_KEY_ENV, OpenAIRecordEncoder};

/// Which encoder to build, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EncoderConfig {
    #[serde(rename = "openai")]
    OpenAI(OpenAIEncoderConfig),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAIEncoderConfig {
    pub model_name: String,
    pub batch_size: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Falls back to `OPENAI_API_KEY` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Requested output size; the model default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    pub retry: RetryConfig,
}

impl Default for OpenAIEncoderConfig {
    fn default() -> Self {
        Self {
            model_name: MODEL_OPENAI_ADA_002.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            base_url: None,
            api_key: None,
            dimension: None,
            timeout_secs: None,
            retry: RetryConfig::default(),
        }
    }
}

/// Retry settings. Waits are in (fractional) seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub min_wait_secs: f64,
    pub multiplier_secs: f64,
    pub max_wait_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_wait_secs: 1.0,
            multiplier_secs: 1.0,
            max_wait_secs: 10.0,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> Result<RetryPolicy, EncodeError> {
        if self.max_attempts == 0 {
            return Err(EncodeError::Config("retry.max_attempts must be at least 1".into()));
        }
        let backoff = Backoff::new(
            secs("retry.min_wait_secs", self.min_wait_secs)?,
            secs("retry.multiplier_secs", self.multiplier_secs)?,
            secs("retry.max_wait_secs", self.max_wait_secs)?,
        );
        if backoff.min > backoff.max {
            return Err(EncodeError::Config(
                "retry.min_wait_secs is larger than retry.max_wait_secs".into(),
            ));
        }
        Ok(RetryPolicy::new(self.max_attempts).with_backoff(backoff))
    }
}

fn secs(field: &str, value: f64) -> Result<Duration, EncodeError> {
    Duration::try_from_secs_f64(value)
        .map_err(|e| EncodeError::Config(format!("{field}: {e}")))
}

impl EncoderConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, EncodeError> {
        serde_yaml::from_str(yaml).map_err(|e| EncodeError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EncodeError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| EncodeError::Config(format!("read {}: {e}", path.display())))?;
        Self::from_yaml(&yaml)
    }

    /// Build the configured encoder, reading secrets from the environment.
    pub fn build(&self) -> Result<Box<dyn RecordEncoder>, EncodeError> {
        self.build_with_env(|key| std::env::var(key).ok())
    }

    /// Build the configured encoder with `env` standing in for the process
    /// environment.
    pub fn build_with_env(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Box<dyn RecordEncoder>, EncodeError> {
        match self {
            EncoderConfig::OpenAI(cfg) => {
                let api_key = cfg
                    .api_key
                    .clone()
                    .filter(|k| !k.is_empty())
                    .or_else(|| env(OPENAI_API_KEY_ENV))
                    .ok_or_else(|| {
                        EncodeError::Config(format!(
                            "no api_key configured and {OPENAI_API_KEY_ENV} is not set"
                        ))
                    })?;
                let encoder =
                    OpenAIRecordEncoder::with_config(&api_key, cfg.embed_config(), cfg.batch_size)?
                        .with_retry(cfg.retry.policy()?);
                Ok(Box::new(encoder))
            }
        }
    }
}

impl OpenAIEncoderConfig {
    pub fn embed_config(&self) -> EmbedConfig {
        let mut cfg = EmbedConfig::default()
            .with_model(&self.model_name)
            .with_dimension(self.dimension.unwrap_or(0));
        if let Some(url) = &self.base_url {
            cfg = cfg.with_base_url(url);
        }
        if let Some(secs) = self.timeout_secs {
            cfg = cfg.with_timeout(Duration::from_secs(secs));
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let cfg = EncoderConfig::from_yaml("type: openai\n").unwrap();
        let EncoderConfig::OpenAI(openai) = &cfg;
        assert_eq!(openai, &OpenAIEncoderConfig::default());
        assert_eq!(openai.model_name, "text-embedding-ada-002");
        assert_eq!(openai.batch_size, 100);
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
type: openai
model_name: text-embedding-3-small
batch_size: 16
base_url: http://localhost:9000/v1
api_key: sk-from-file
dimension: 512
timeout_secs: 5
retry:
  max_attempts: 5
  min_wait_secs: 0.5
  max_wait_secs: 4
"#;
        let EncoderConfig::OpenAI(cfg) = EncoderConfig::from_yaml(yaml).unwrap();
        assert_eq!(cfg.batch_size, 16);
        assert_eq!(cfg.api_key.as_deref(), Some("sk-from-file"));
        assert_eq!(cfg.retry.max_attempts, 5);
        assert_eq!(cfg.retry.multiplier_secs, 1.0);

        let embed = cfg.embed_config();
        assert_eq!(embed.model, "text-embedding-3-small");
        assert_eq!(embed.dimension, 512);
        assert_eq!(embed.base_url, "http://localhost:9000/v1");
        assert_eq!(embed.timeout, Some(Duration::from_secs(5)));

        let policy = cfg.retry.policy().unwrap();
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.backoff().min, Duration::from_millis(500));
        assert_eq!(policy.backoff().max, Duration::from_secs(4));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let err = EncoderConfig::from_yaml("type: cohere\n").unwrap_err();
        assert!(matches!(err, EncodeError::Config(_)));
    }

    #[test]
    fn test_build_needs_api_key() {
        let cfg = EncoderConfig::from_yaml("type: openai\n").unwrap();
        let err = cfg.build_with_env(no_env).err().unwrap();
        assert!(matches!(err, EncodeError::Config(msg) if msg.contains(OPENAI_API_KEY_ENV)));

        let encoder = cfg
            .build_with_env(|key| (key == OPENAI_API_KEY_ENV).then(|| "sk-env".to_string()))
            .unwrap();
        assert_eq!(encoder.batch_size(), 100);
        assert_eq!(encoder.dimension(), 1536);
        assert!(!encoder.supports_async());
    }

    #[test]
    fn test_build_rejects_zero_batch() {
        let cfg = EncoderConfig::from_yaml("type: openai\napi_key: sk\nbatch_size: 0\n").unwrap();
        assert!(matches!(
            cfg.build_with_env(no_env).err().unwrap(),
            EncodeError::Config(_)
        ));
    }

    #[test]
    fn test_invalid_retry() {
        let zero = RetryConfig {
            max_attempts: 0,
            ..RetryConfig::default()
        };
        assert!(zero.policy().is_err());

        let negative = RetryConfig {
            min_wait_secs: -1.0,
            ..RetryConfig::default()
        };
        assert!(negative.policy().is_err());

        let inverted = RetryConfig {
            min_wait_secs: 20.0,
            ..RetryConfig::default()
        };
        assert!(inverted.policy().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("encoder.yaml");
        std::fs::write(&path, "type: openai\nmodel_name: text-embedding-3-large\n").unwrap();

        let EncoderConfig::OpenAI(cfg) = EncoderConfig::from_file(&path).unwrap();
        assert_eq!(cfg.model_name, "text-embedding-3-large");

        let missing = EncoderConfig::from_file(dir.path().join("nope.yaml"));
        assert!(matches!(missing, Err(EncodeError::Config(_))));
    }
}
