//! The endpoint contract.
//!
//! Each API area is one enum whose variants carry their own parameters and
//! implement [`Endpoint`]. Shared behavior lives in trait defaults and in the
//! free function [`target`].

use serde::de::DeserializeOwned;
use url::Url;

use crate::capabilities::ApiCapabilities;
use crate::requirements::CapabilityRequirements;
use crate::target::{HttpMethod, RequestBody, Target};

/// API version prefix used by most endpoints.
pub const DEFAULT_CONTEXT: &[&str] = &["api", "v1"];

pub trait Endpoint: Send + Sync {
    /// What a successful response decodes into.
    type Output: DeserializeOwned + Send + 'static;

    /// Path prefix ahead of [`path_components`](Endpoint::path_components).
    fn context(&self) -> &'static [&'static str] {
        DEFAULT_CONTEXT
    }

    fn path_components(&self) -> Vec<String>;

    fn method(&self) -> HttpMethod;

    fn query_items(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn body(&self) -> Option<RequestBody> {
        None
    }

    fn headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Requirements the server must satisfy. `None` means always callable.
    fn requires(&self) -> Option<CapabilityRequirements> {
        None
    }

    /// Safe value to substitute when the endpoint cannot be called.
    fn fallback(&self) -> Option<Self::Output> {
        None
    }

    fn supported_by(&self, capabilities: &ApiCapabilities) -> bool {
        self.requires()
            .map_or(true, |requirements| requirements.satisfied_by(capabilities))
    }
}

/// Marks an endpoint as cursor-paginated through the `Link` header.
pub trait PagedEndpoint: Endpoint {}

/// Build the [`Target`] for `endpoint` against `base_url`.
///
/// With a token, an `Authorization: Bearer` header is added.
pub fn target<E: Endpoint + ?Sized>(
    endpoint: &E,
    base_url: &Url,
    access_token: Option<&str>,
) -> Target {
    let path = endpoint
        .context()
        .iter()
        .map(|s| s.to_string())
        .chain(endpoint.path_components())
        .collect();

    let mut target = Target::new(base_url.clone(), endpoint.method(), path)
        .with_query(endpoint.query_items())
        .with_body(endpoint.body());
    for (name, value) in endpoint.headers() {
        target = target.with_header(name, value);
    }
    if let Some(token) = access_token {
        target = target.with_header("Authorization", format!("Bearer {token}"));
    }
    target
}
