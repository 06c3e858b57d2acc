//! The capability-aware API client.
//!
//! Every call goes through the same pipeline:
//!
//! | Step | Outcome on failure |
//! |------|--------------------|
//! | Snapshot capabilities and token | none |
//! | Build the [`Target`] (bearer auth when a token is set) | none |
//! | Gate on [`Endpoint::requires`] | fallback with no network call, else `ApiNotAvailable` |
//! | Execute through the [`Transport`] | `Transport` / `Http`, upgraded to `Annotated` when the body is an API error |
//! | Decode the body | `Decode` |
//!
//! When the capabilities carry [`CompatibilityMode::FallbackOnErrors`] and the
//! endpoint declares a fallback, any failure from the last two steps is
//! swallowed and the fallback returned instead.
//!
//! [`CompatibilityMode::FallbackOnErrors`]: fedicap::CompatibilityMode::FallbackOnErrors

use std::sync::{Arc, PoisonError, RwLock};

use async_stream::try_stream;
use fedicap::endpoint::target;
use fedicap::endpoints::InstanceEndpoint;
use fedicap::{
    ApiCapabilities, DebugLocation, Endpoint, FedicapError, HttpReason, PagedEndpoint, PagedResult,
    Paging, Target, TransportFailure, TransportReason,
};
use fedicap_api::{ApiErrorBody, Instance};
use futures::Stream;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::discovery::DiscoveryClient;
use crate::store::{SecretStore, StoreError};
use crate::transport::{decode_response, Transport};

pub struct ApiClient {
    instance_url: Url,
    capabilities: RwLock<Arc<ApiCapabilities>>,
    access_token: RwLock<Option<String>>,
    transport: Arc<dyn Transport>,
    store: Option<Arc<dyn SecretStore>>,
}

impl ApiClient {
    pub fn new(
        instance_url: Url,
        capabilities: ApiCapabilities,
        access_token: Option<String>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            instance_url,
            capabilities: RwLock::new(Arc::new(capabilities)),
            access_token: RwLock::new(access_token),
            transport,
            store: None,
        }
    }

    /// Persist refreshed capabilities through `store`.
    pub fn with_store(mut self, store: Arc<dyn SecretStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Resume a session from a secret store. The store stays attached.
    pub async fn from_store(
        store: Arc<dyn SecretStore>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, StoreError> {
        let instance_url = store.instance_url().await?;
        let access_token = store.access_token().await?;
        let capabilities = store.api_capabilities().await?;
        Ok(Self::new(instance_url, capabilities, access_token, transport).with_store(store))
    }

    pub fn instance_url(&self) -> &Url {
        &self.instance_url
    }

    pub fn capabilities(&self) -> Arc<ApiCapabilities> {
        Arc::clone(&self.capabilities.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Replace the capabilities snapshot. Calls already in flight keep theirs.
    pub fn set_capabilities(&self, capabilities: ApiCapabilities) {
        *self
            .capabilities
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(capabilities);
    }

    pub fn access_token(&self) -> Option<String> {
        self.access_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_access_token(&self, access_token: Option<String>) {
        *self
            .access_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = access_token;
    }

    /// Whether `endpoint` passes its capability gate right now.
    pub fn supports<E: Endpoint + ?Sized>(&self, endpoint: &E) -> bool {
        endpoint.supported_by(&self.capabilities())
    }

    // -----------------------------------------------------------------------
    // Calls
    // -----------------------------------------------------------------------

    pub async fn call<E: Endpoint>(
        &self,
        endpoint: &E,
        location: DebugLocation,
    ) -> Result<E::Output, FedicapError> {
        self.call_with_cancellation(endpoint, location, &CancellationToken::new())
            .await
    }

    /// As [`call`](Self::call). Cancelling `cancel` before the response
    /// arrives yields a `Cancelled` transport error.
    pub async fn call_with_cancellation<E: Endpoint>(
        &self,
        endpoint: &E,
        location: DebugLocation,
        cancel: &CancellationToken,
    ) -> Result<E::Output, FedicapError> {
        let snapshot = self.snapshot();
        match self.run(endpoint, None, &snapshot, &location, cancel).await? {
            Dispatch::Fallback(output) => Ok(output),
            Dispatch::Completed(page) => Ok(page.result),
        }
    }

    pub async fn call_paged<E>(
        &self,
        endpoint: &E,
        paging: &Paging,
        location: DebugLocation,
    ) -> Result<PagedResult<E::Output>, FedicapError>
    where
        E: PagedEndpoint,
        E::Output: Default,
    {
        self.call_paged_with_cancellation(endpoint, paging, location, &CancellationToken::new())
            .await
    }

    /// Paged variant of [`call_with_cancellation`](Self::call_with_cancellation).
    ///
    /// An endpoint the server does not support yields a terminal page (its
    /// fallback, or the empty value) and never `ApiNotAvailable`.
    pub async fn call_paged_with_cancellation<E>(
        &self,
        endpoint: &E,
        paging: &Paging,
        location: DebugLocation,
        cancel: &CancellationToken,
    ) -> Result<PagedResult<E::Output>, FedicapError>
    where
        E: PagedEndpoint,
        E::Output: Default,
    {
        let snapshot = self.snapshot();
        if !endpoint.supported_by(&snapshot.capabilities) {
            debug!("api: paged endpoint unsupported, returning terminal page");
            return Ok(PagedResult::terminal(endpoint.fallback().unwrap_or_default()));
        }
        match self
            .run(endpoint, Some(paging), &snapshot, &location, cancel)
            .await?
        {
            Dispatch::Fallback(output) => Ok(PagedResult::terminal(output)),
            Dispatch::Completed(page) => Ok(page),
        }
    }

    /// Walk older pages, starting from `paging`.
    ///
    /// Each page's `max_id` is replayed into the next request. The stream
    /// ends after a page without a `max_id`, an empty page, or a `max_id`
    /// that repeats the previous request's.
    pub fn pages<'a, E, T>(
        &'a self,
        endpoint: &'a E,
        paging: Paging,
        location: DebugLocation,
    ) -> impl Stream<Item = Result<PagedResult<Vec<T>>, FedicapError>> + 'a
    where
        E: PagedEndpoint<Output = Vec<T>>,
        T: Send + 'static,
    {
        try_stream! {
            let mut next = Some(paging);
            while let Some(paging) = next.take() {
                let page = self.call_paged(endpoint, &paging, location.clone()).await?;
                if !page.result.is_empty() {
                    next = paging
                        .older(&page.info)
                        .filter(|older| older.max_id != paging.max_id);
                }
                yield page;
            }
        }
    }

    /// Re-run discovery and replace the capabilities snapshot.
    ///
    /// For a known flavor the instance document is fetched to detect
    /// optional features; failure there only loses the features. The
    /// current compatibility mode is kept.
    pub async fn refresh_capabilities(
        &self,
        location: DebugLocation,
    ) -> Result<Arc<ApiCapabilities>, FedicapError> {
        let discovered = DiscoveryClient::new(Arc::clone(&self.transport))
            .capabilities(&self.instance_url, location.clone())
            .await?;
        let mut refreshed =
            discovered.with_compatibility_mode(self.capabilities().compatibility_mode);

        if refreshed.flavor.is_some() {
            let target = target_for(
                &InstanceEndpoint,
                &self.instance_url,
                None,
                self.access_token().as_deref(),
            );
            match self
                .dispatch::<Instance>(&target, &refreshed, &location, &CancellationToken::new())
                .await
            {
                Ok(page) => {
                    refreshed = refreshed.with_features(ApiCapabilities::detect_features(&page.result));
                }
                Err(e) => warn!("api: feature detection failed for {}: {e}", self.instance_url),
            }
        }

        info!("api: {} capabilities refreshed: {refreshed}", self.instance_url);
        let refreshed = Arc::new(refreshed);
        *self
            .capabilities
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::clone(&refreshed);

        if let Some(store) = &self.store {
            if let Err(e) = store.set_api_capabilities(&refreshed).await {
                warn!("api: could not persist capabilities: {e}");
            }
        }
        Ok(refreshed)
    }

    // -----------------------------------------------------------------------
    // Pipeline
    // -----------------------------------------------------------------------

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            capabilities: self.capabilities(),
            token: self.access_token(),
        }
    }

    /// Gate, execute and decode against one snapshot.
    async fn run<E: Endpoint>(
        &self,
        endpoint: &E,
        paging: Option<&Paging>,
        snapshot: &Snapshot,
        location: &DebugLocation,
        cancel: &CancellationToken,
    ) -> Result<Dispatch<E::Output>, FedicapError> {
        let capabilities = &snapshot.capabilities;
        let target = target_for(
            endpoint,
            &self.instance_url,
            paging,
            snapshot.token.as_deref(),
        );

        if !endpoint.supported_by(capabilities) {
            return match endpoint.fallback() {
                Some(fallback) => {
                    debug!(
                        "api: {} {} unsupported on {capabilities}, using fallback",
                        target.method,
                        target.url()
                    );
                    Ok(Dispatch::Fallback(fallback))
                }
                None => Err(FedicapError::ApiNotAvailable {
                    capabilities: capabilities.as_ref().clone(),
                    method: target.method,
                    url: target.url(),
                    location: location.clone(),
                }),
            };
        }

        match self.dispatch(&target, capabilities, location, cancel).await {
            Ok(page) => Ok(Dispatch::Completed(page)),
            Err(error) => {
                if capabilities.falls_back_on_errors() {
                    if let Some(fallback) = endpoint.fallback() {
                        debug!("api: substituting fallback after failure: {error}");
                        return Ok(Dispatch::Fallback(fallback));
                    }
                }
                if error.is_quiet() {
                    debug!("api: {error}");
                } else {
                    warn!("api: {error}");
                }
                Err(error)
            }
        }
    }

    /// Execute and decode without gating.
    async fn dispatch<T: DeserializeOwned>(
        &self,
        target: &Target,
        capabilities: &ApiCapabilities,
        location: &DebugLocation,
        cancel: &CancellationToken,
    ) -> Result<PagedResult<T>, FedicapError> {
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FedicapError::Transport {
                failure: TransportFailure::new(TransportReason::Cancelled),
                method: target.method,
                url: target.url(),
                location: location.clone(),
            }),
            response = self.transport.execute(target, location) => response,
        }
        .map_err(|error| annotate(error, capabilities))?;

        let result = decode_response(target, &response, location)?;
        Ok(PagedResult {
            result,
            info: response.page_info(),
        })
    }
}

/// Capabilities and token as read once at the start of a call.
struct Snapshot {
    capabilities: Arc<ApiCapabilities>,
    token: Option<String>,
}

enum Dispatch<T> {
    Fallback(T),
    Completed(PagedResult<T>),
}

fn target_for<E: Endpoint + ?Sized>(
    endpoint: &E,
    instance_url: &Url,
    paging: Option<&Paging>,
    token: Option<&str>,
) -> Target {
    let target = target(endpoint, instance_url, token);
    match paging {
        Some(paging) => paging.apply(target),
        None => target,
    }
}

/// Upgrade an HTTP error whose body is a structured API error.
fn annotate(error: FedicapError, capabilities: &ApiCapabilities) -> FedicapError {
    let FedicapError::Http {
        reason: HttpReason::Status(status),
        body,
        method,
        url,
        location,
    } = error
    else {
        return error;
    };
    match serde_json::from_slice::<ApiErrorBody>(&body) {
        Ok(api_error) => FedicapError::Annotated {
            error: api_error,
            status,
            capabilities: capabilities.clone(),
            method,
            url,
            location,
        },
        Err(_) => FedicapError::Http {
            reason: HttpReason::Status(status),
            body,
            method,
            url,
            location,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use fedicap::endpoints::{
        AnnouncementsEndpoint, DismissAnnouncementEndpoint, StatusEndpoint, StatusesEndpoint,
        TagsEndpoint,
    };
    use fedicap::{debug_location, CompatibilityMode, Feature};
    use futures::StreamExt;
    use serde_json::json;

    use super::*;
    use crate::store::memory::MemorySecretStore;
    use crate::transport::RawResponse;

    /// Replays queued responses in order and records every target.
    #[derive(Default)]
    struct Scripted {
        responses: Mutex<VecDeque<Result<RawResponse, (u16, Vec<u8>)>>>,
        seen: Mutex<Vec<Target>>,
        delay: Option<Duration>,
    }

    impl Scripted {
        fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                delay: Some(delay),
                ..Self::default()
            })
        }

        fn ok(self: &Arc<Self>, body: serde_json::Value, link: Option<&str>) -> Arc<Self> {
            let mut headers = BTreeMap::new();
            if let Some(link) = link {
                headers.insert("link".to_string(), link.to_string());
            }
            self.responses.lock().unwrap().push_back(Ok(RawResponse {
                status: 200,
                headers,
                body: body.to_string().into_bytes(),
            }));
            Arc::clone(self)
        }

        fn status(self: &Arc<Self>, status: u16, body: &str) -> Arc<Self> {
            self.responses
                .lock()
                .unwrap()
                .push_back(Err((status, body.as_bytes().to_vec())));
            Arc::clone(self)
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }

        fn target(&self, index: usize) -> Target {
            self.seen.lock().unwrap()[index].clone()
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn execute(
            &self,
            target: &Target,
            location: &DebugLocation,
        ) -> Result<RawResponse, FedicapError> {
            self.seen.lock().unwrap().push(target.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let next = self.responses.lock().unwrap().pop_front();
            match next {
                Some(Ok(response)) => Ok(response),
                Some(Err((status, body))) => Err(FedicapError::Http {
                    reason: HttpReason::Status(status),
                    body,
                    method: target.method,
                    url: target.url(),
                    location: location.clone(),
                }),
                None => Err(FedicapError::Http {
                    reason: HttpReason::Status(404),
                    body: Vec::new(),
                    method: target.method,
                    url: target.url(),
                    location: location.clone(),
                }),
            }
        }
    }

    fn client(capabilities: ApiCapabilities, transport: Arc<Scripted>) -> ApiClient {
        ApiClient::new(
            Url::parse("https://social.example").unwrap(),
            capabilities,
            None,
            transport,
        )
    }

    fn status_json(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "uri": format!("https://social.example/s/{id}"),
            "account": {"id": "9", "username": "alice", "acct": "alice"},
        })
    }

    #[tokio::test]
    async fn unsupported_endpoint_with_fallback_makes_no_call() {
        let transport = Scripted::new();
        let api = client(ApiCapabilities::from_parts("mastodon", "3.0.0"), transport.clone());
        let announcements = api
            .call(&AnnouncementsEndpoint, debug_location!())
            .await
            .unwrap();
        assert!(announcements.is_empty());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn unknown_server_fails_closed() {
        let transport = Scripted::new();
        let api = client(ApiCapabilities::default(), transport.clone());
        let error = api
            .call(
                &DismissAnnouncementEndpoint { id: "1".into() },
                debug_location!(),
            )
            .await
            .unwrap_err();
        let FedicapError::ApiNotAvailable { capabilities, url, .. } = &error else {
            panic!("expected ApiNotAvailable, got {error:?}");
        };
        assert_eq!(capabilities, &ApiCapabilities::default());
        assert_eq!(
            url.as_str(),
            "https://social.example/api/v1/announcements/1/dismiss"
        );
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn unsupported_paged_endpoint_is_an_empty_terminal_page() {
        let transport = Scripted::new();
        let api = client(ApiCapabilities::from_parts("pleroma", "2.5.0"), transport.clone());
        let page = api
            .call_paged(&StatusesEndpoint::BubbleTimeline, &Paging::default(), debug_location!())
            .await
            .unwrap();
        assert!(page.result.is_empty());
        assert!(page.info.is_empty());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn cursors_are_replayed_verbatim() {
        let transport = Scripted::new().ok(
            json!([status_json("114"), status_json("109")]),
            Some(
                r#"<https://social.example/api/v1/timelines/home?max_id=AbC%2B109>; rel="next", <https://social.example/api/v1/timelines/home?min_id=114>; rel="prev""#,
            ),
        );
        let transport = transport.ok(json!([]), None);
        let api = client(ApiCapabilities::from_parts("mastodon", "4.2.1"), transport.clone());

        let first = api
            .call_paged(&StatusesEndpoint::HomeTimeline, &Paging::with_limit(2), debug_location!())
            .await
            .unwrap();
        assert_eq!(first.result.len(), 2);
        assert_eq!(first.info.max_id.as_deref(), Some("AbC%2B109"));
        assert_eq!(first.info.min_id.as_deref(), Some("114"));

        let older = Paging::with_limit(2).older(&first.info).unwrap();
        api.call_paged(&StatusesEndpoint::HomeTimeline, &older, debug_location!())
            .await
            .unwrap();
        let replayed = transport.target(1);
        assert_eq!(replayed.query_value("max_id"), Some("AbC%2B109"));
        assert_eq!(replayed.url().query(), Some("limit=2&max_id=AbC%2B109"));
    }

    #[tokio::test]
    async fn timestamp_cursors_are_not_reencoded() {
        let transport = Scripted::new()
            .ok(
                json!([status_json("2")]),
                Some(r#"<https://social.example/api/v1/favourites?max_id=2024-01-01T00:00:00Z>; rel="next""#),
            )
            .ok(json!([]), None);
        let api = client(ApiCapabilities::from_parts("mastodon", "4.2.1"), transport.clone());
        let first = api
            .call_paged(&StatusesEndpoint::Favourites, &Paging::default(), debug_location!())
            .await
            .unwrap();
        let older = Paging::default().older(&first.info).unwrap();
        api.call_paged(&StatusesEndpoint::Favourites, &older, debug_location!())
            .await
            .unwrap();
        assert_eq!(
            transport.target(1).url().query(),
            Some("max_id=2024-01-01T00:00:00Z")
        );
    }

    #[tokio::test]
    async fn one_snapshot_gates_and_builds_the_request() {
        let transport = Scripted::new().ok(json!([status_json("1")]), None);
        let api = client(ApiCapabilities::from_parts("pleroma", "2.5.0"), transport.clone());
        let snapshot = Snapshot {
            capabilities: Arc::new(
                ApiCapabilities::from_parts("akkoma", "3.10.4")
                    .with_features([Feature::BubbleTimeline]),
            ),
            token: Some("s3cret".into()),
        };
        assert!(!api.supports(&StatusesEndpoint::BubbleTimeline));

        let dispatched = api
            .run(
                &StatusesEndpoint::BubbleTimeline,
                Some(&Paging::with_limit(5)),
                &snapshot,
                &debug_location!(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        let Dispatch::Completed(page) = dispatched else {
            panic!("expected the request to go out");
        };
        assert_eq!(page.result.len(), 1);
        assert_eq!(transport.calls(), 1);
        let sent = transport.target(0);
        assert_eq!(
            sent.headers.get("Authorization").map(String::as_str),
            Some("Bearer s3cret")
        );
        assert_eq!(sent.query_value("limit"), Some("5"));
    }

    #[tokio::test]
    async fn api_error_bodies_are_annotated() {
        let transport = Scripted::new().status(422, r#"{"error":"Validation failed"}"#);
        let caps = ApiCapabilities::from_parts("mastodon", "4.2.1");
        let api = client(caps.clone(), transport);
        let error = api
            .call(&StatusEndpoint::Favourite { id: "1".into() }, debug_location!())
            .await
            .unwrap_err();
        let FedicapError::Annotated {
            error: body,
            status,
            capabilities,
            ..
        } = &error
        else {
            panic!("expected Annotated, got {error:?}");
        };
        assert_eq!(body.error, "Validation failed");
        assert_eq!(*status, 422);
        assert_eq!(capabilities, &caps);
    }

    #[tokio::test]
    async fn non_json_error_bodies_stay_http_errors() {
        let transport = Scripted::new().status(502, "<html>Bad Gateway</html>");
        let api = client(ApiCapabilities::from_parts("mastodon", "4.2.1"), transport);
        let error = api
            .call(&StatusEndpoint::Get { id: "1".into() }, debug_location!())
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            FedicapError::Http {
                reason: HttpReason::Status(502),
                ..
            }
        ));
        assert!(error.is_quiet());
    }

    #[tokio::test]
    async fn fallback_on_errors_substitutes_the_fallback() {
        let transport = Scripted::new().ok(json!({"not": "a list"}), None);
        let caps = ApiCapabilities::from_parts("mastodon", "4.2.1")
            .with_compatibility_mode(Some(CompatibilityMode::FallbackOnErrors));
        let api = client(caps, transport.clone());
        let tags = api.call(&TagsEndpoint::Followed, debug_location!()).await.unwrap();
        assert!(tags.is_empty());
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn fail_on_errors_surfaces_the_decode_failure() {
        let transport = Scripted::new().ok(json!({"not": "a list"}), None);
        let caps = ApiCapabilities::from_parts("mastodon", "4.2.1")
            .with_compatibility_mode(Some(CompatibilityMode::FailOnErrors));
        let api = client(caps, transport);
        let error = api
            .call(&TagsEndpoint::Followed, debug_location!())
            .await
            .unwrap_err();
        assert!(matches!(error, FedicapError::Decode { .. }));
    }

    #[tokio::test]
    async fn cancellation_yields_a_quiet_cancelled_error() {
        let transport = Scripted::slow(Duration::from_secs(30));
        let api = client(ApiCapabilities::from_parts("mastodon", "4.2.1"), transport);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let error = api
            .call_with_cancellation(
                &StatusEndpoint::Get { id: "1".into() },
                debug_location!(),
                &cancel,
            )
            .await
            .unwrap_err();
        let FedicapError::Transport { failure, .. } = &error else {
            panic!("expected a transport error, got {error:?}");
        };
        assert_eq!(failure.reason, TransportReason::Cancelled);
        assert!(error.is_quiet());
    }

    #[tokio::test]
    async fn token_becomes_a_bearer_header() {
        let transport = Scripted::new().ok(status_json("1"), None);
        let api = client(ApiCapabilities::from_parts("mastodon", "4.2.1"), transport.clone());
        api.set_access_token(Some("s3cret".into()));
        api.call(&StatusEndpoint::Get { id: "1".into() }, debug_location!())
            .await
            .unwrap();
        let sent = transport.target(0);
        assert_eq!(
            sent.headers.get("Authorization").map(String::as_str),
            Some("Bearer s3cret")
        );
    }

    #[tokio::test]
    async fn pages_stream_stops_without_a_cursor() {
        let transport = Scripted::new()
            .ok(
                json!([status_json("3"), status_json("2")]),
                Some(r#"<https://social.example/api/v1/favourites?max_id=2>; rel="next""#),
            )
            .ok(json!([status_json("1")]), None);
        let api = client(ApiCapabilities::from_parts("mastodon", "4.2.1"), transport.clone());
        let pages: Vec<_> = api
            .pages(&StatusesEndpoint::Favourites, Paging::default(), debug_location!())
            .collect()
            .await;
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].as_ref().unwrap().result.len(), 1);
        assert_eq!(transport.target(1).query_value("max_id"), Some("2"));
    }

    #[tokio::test]
    async fn refresh_detects_features_and_persists() {
        let transport = Scripted::new()
            .ok(
                json!({"links": [{
                    "rel": "http://nodeinfo.diaspora.software/ns/schema/2.0",
                    "href": "https://social.example/nodeinfo/2.0"
                }]}),
                None,
            )
            .ok(json!({"software": {"name": "akkoma", "version": "3.10.4"}}), None)
            .ok(
                json!({
                    "uri": "social.example",
                    "title": "Example",
                    "pleroma": {"metadata": {"features": ["bubble_timeline"]}}
                }),
                None,
            );
        let store = Arc::new(MemorySecretStore::new());
        let api = client(
            ApiCapabilities::default()
                .with_compatibility_mode(Some(CompatibilityMode::FallbackOnErrors)),
            transport.clone(),
        )
        .with_store(store.clone());

        let refreshed = api.refresh_capabilities(debug_location!()).await.unwrap();
        assert!(refreshed.has_feature(Feature::BubbleTimeline));
        assert!(refreshed.falls_back_on_errors());
        assert_eq!(transport.calls(), 3);
        assert_eq!(*api.capabilities(), *refreshed);
        assert_eq!(store.api_capabilities().await.unwrap(), *refreshed);
        assert!(api.supports(&StatusesEndpoint::BubbleTimeline));
    }
}
