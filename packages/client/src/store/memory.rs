//! In-memory secret store. Contents are lost when the process exits.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use fedicap::ApiCapabilities;
use url::Url;

use super::{SecretStore, StoreError};

#[derive(Default)]
struct Inner {
    instance_url: Option<Url>,
    access_token: Option<String>,
    capabilities: Option<ApiCapabilities>,
}

/// Thread-safe, in-memory implementation of [`SecretStore`].
#[derive(Default)]
pub struct MemorySecretStore {
    inner: RwLock<Inner>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn instance_url(&self) -> Result<Url, StoreError> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .instance_url
            .clone()
            .ok_or(StoreError::Missing("instance URL"))
    }

    async fn set_instance_url(&self, url: &Url) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.instance_url = Some(url.clone());
        Ok(())
    }

    async fn access_token(&self) -> Result<Option<String>, StoreError> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(inner.access_token.clone())
    }

    async fn set_access_token(&self, token: Option<&str>) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.access_token = token.map(str::to_string);
        Ok(())
    }

    async fn api_capabilities(&self) -> Result<ApiCapabilities, StoreError> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(inner.capabilities.clone().unwrap_or_default())
    }

    async fn set_api_capabilities(
        &self,
        capabilities: &ApiCapabilities,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.capabilities = Some(capabilities.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_contract() {
        crate::store::tests::exercise(&MemorySecretStore::new()).await;
    }
}
