//! Retry policy for calls to unreliable remote dependencies.
//!
//! A [`RetryPolicy`] wraps any single fallible call: transient failures are
//! retried with a randomized exponential [`Backoff`], everything else is
//! returned to the caller as-is.

pub mod backoff;
pub mod policy;

pub use backoff::Backoff;
pub use policy::{RetryPolicy, Sleep};
