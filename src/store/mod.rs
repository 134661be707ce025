//! ParameterStore trait and remote lookup integration.
//!
//! Provides an abstraction layer over the AWS SDK so the resolver can be
//! exercised against in-memory stores in tests.

pub mod ssm;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from a parameter store lookup.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("parameter store not configured: {0}")]
    NotConfigured(String),

    #[error("parameter not found: {0}")]
    NotFound(String),

    #[error("parameter {0} has no value")]
    MissingValue(String),

    #[error("parameter store API error: {0}")]
    Api(String),

    #[error("lookup cancelled")]
    Cancelled,
}

/// Remote key/value lookup used to resolve `ssm://` references.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Fetch the value of the parameter called `name`.
    ///
    /// When `with_decryption` is true, encrypted (`SecureString`) values are
    /// returned in plain text.
    async fn get_parameter(&self, name: &str, with_decryption: bool) -> Result<String, StoreError>;
}
