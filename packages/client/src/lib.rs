//! Async client for Fediverse server APIs.
//!
//! Builds on the pure `fedicap` crate: this crate owns the network, the
//! async runtime and persistence.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`transport`] | [`Transport`] trait and the `reqwest`-backed [`HttpTransport`] |
//! | [`discovery`] | Two-hop NodeInfo lookup |
//! | [`api_client`] | [`ApiClient`]: gated calls, fallbacks, cursor paging |
//! | [`store`] | [`SecretStore`] with memory and SQLite backends |
//! | [`config`] | [`ClientConfig`] from environment variables |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fedicap::{debug_location, endpoints::StatusesEndpoint, Paging};
//! use fedicap_client::{ApiClient, ClientConfig, HttpTransport};
//!
//! let config = ClientConfig::from_env()?;
//! let transport = Arc::new(HttpTransport::new(config.http_client()?));
//! let api = ApiClient::new(config.instance_url()?, Default::default(), config.access_token, transport);
//! api.refresh_capabilities(debug_location!()).await?;
//! let page = api
//!     .call_paged(&StatusesEndpoint::HomeTimeline, &Paging::with_limit(20), debug_location!())
//!     .await?;
//! ```

pub mod api_client;
pub mod config;
pub mod discovery;
pub mod store;
pub mod transport;

pub use api_client::ApiClient;
pub use config::{ClientConfig, ConfigError};
pub use discovery::DiscoveryClient;
pub use store::memory::MemorySecretStore;
pub use store::sqlite::SqliteSecretStore;
pub use store::{SecretStore, StoreError};
pub use transport::{HttpTransport, RawResponse, RequestInterceptor, Transport};
