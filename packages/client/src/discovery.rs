//! Two-hop NodeInfo discovery.
//!
//! 1. `GET <instance>/.well-known/nodeinfo` returns a JRD listing schema links.
//! 2. The newest supported schema link is fetched for the [`NodeInfo`]
//!    document, whose `software` block identifies the server.

use std::sync::Arc;

use fedicap::discovery::{select_schema_link, WELL_KNOWN_NODEINFO};
use fedicap::{ApiCapabilities, DebugLocation, FedicapError, HttpMethod, Target};
use fedicap_api::{Jrd, NodeInfo};
use tracing::info;
use url::Url;

use crate::transport::{execute_and_decode, Transport};

pub struct DiscoveryClient {
    transport: Arc<dyn Transport>,
}

impl DiscoveryClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Fetch the NodeInfo document for `instance_url`.
    pub async fn discover(
        &self,
        instance_url: &Url,
        location: DebugLocation,
    ) -> Result<NodeInfo, FedicapError> {
        let well_known = Target::new(
            instance_url.clone(),
            HttpMethod::Get,
            WELL_KNOWN_NODEINFO.iter().map(|s| s.to_string()).collect(),
        );
        let jrd: Jrd = execute_and_decode(self.transport.as_ref(), &well_known, &location).await?;

        let schema_url = select_schema_link(&jrd).map_err(|failure| FedicapError::Discovery {
            failure,
            method: HttpMethod::Get,
            url: well_known.url(),
            location: location.clone(),
        })?;

        let document = Target::new(schema_url, HttpMethod::Get, Vec::new());
        let node_info: NodeInfo =
            execute_and_decode(self.transport.as_ref(), &document, &location).await?;

        info!(
            "discovery: {instance_url} runs {} {}",
            node_info.software.name, node_info.software.version
        );
        Ok(node_info)
    }

    /// Discover and derive capabilities. Features and compatibility mode are
    /// left empty; see [`ApiClient::refresh_capabilities`](crate::ApiClient::refresh_capabilities).
    pub async fn capabilities(
        &self,
        instance_url: &Url,
        location: DebugLocation,
    ) -> Result<ApiCapabilities, FedicapError> {
        let node_info = self.discover(instance_url, location).await?;
        Ok(ApiCapabilities::from_software(&node_info.software))
    }
}
