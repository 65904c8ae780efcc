//! Record encoders for a knowledge base.
//!
//! A [`RecordEncoder`] turns document chunks and queries into records that
//! carry vectors. Inputs are split into batches, each batch is one remote
//! embedding call wrapped in a [`kbase_retry::RetryPolicy`], and results come
//! back in input order or not at all.

pub mod config;
pub mod dense;
pub mod encoder;
pub mod error;
pub mod models;
pub mod openai;


pub use config::{EncoderConfig, OpenAIEncoderConfig, RetryConfig};
pub use dense::{DenseRecordEncoder, DEFAULT_BATCH_SIZE};
pub use encoder::RecordEncoder;
pub use error::EncodeError;
pub use models::{Chunk, EncodedChunk, EncodedQuery, Query, SparseVector};
pub use openai::{OpenAIRecordEncoder, OPENAI_API_KEY_ENV};
