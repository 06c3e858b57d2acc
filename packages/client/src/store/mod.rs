//! Credential and capability persistence.
//!
//! The [`SecretStore`] trait is what an [`ApiClient`](crate::ApiClient) needs
//! from the outside world to resume a session: which instance, which token,
//! and what was last learned about the server. Capabilities are stored
//! opaquely as JSON.
//!
//! # Implementations
//!
//! | Type | When to use |
//! |------|-------------|
//! | [`MemorySecretStore`] | Tests, one-shot commands |
//! | [`SqliteSecretStore`] | Durable single-file store |
//!
//! [`MemorySecretStore`]: memory::MemorySecretStore
//! [`SqliteSecretStore`]: sqlite::SqliteSecretStore

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use fedicap::ApiCapabilities;
use url::Url;

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A required value has never been stored.
    #[error("no {0} stored")]
    Missing(&'static str),

    /// A stored value could not be parsed back.
    #[error("stored {what} is corrupt: {reason}")]
    Corrupt { what: &'static str, reason: String },

    /// An unexpected error in the underlying backend.
    #[error("internal store error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// SecretStore trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SecretStore: Send + Sync + 'static {
    /// Fails with [`StoreError::Missing`] when no instance was stored.
    async fn instance_url(&self) -> Result<Url, StoreError>;

    async fn set_instance_url(&self, url: &Url) -> Result<(), StoreError>;

    async fn access_token(&self) -> Result<Option<String>, StoreError>;

    /// `None` removes the token.
    async fn set_access_token(&self, token: Option<&str>) -> Result<(), StoreError>;

    /// The last stored capabilities, or the "nothing known" default.
    async fn api_capabilities(&self) -> Result<ApiCapabilities, StoreError>;

    async fn set_api_capabilities(&self, capabilities: &ApiCapabilities)
        -> Result<(), StoreError>;
}
