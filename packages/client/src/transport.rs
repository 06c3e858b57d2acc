//! Executing [`Target`]s over HTTP.
//!
//! [`Transport`] is the seam between request description and the network.
//! [`HttpTransport`] is the production implementation over `reqwest`; tests
//! substitute stubs that record targets and return canned responses.

use std::collections::BTreeMap;
use std::error::Error as _;
use std::io;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use fedicap::{
    decode_json, DebugLocation, FedicapError, HttpMethod, HttpReason, PageInfo, Target,
    TransportFailure, TransportReason,
};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

// ---------------------------------------------------------------------------
// RawResponse
// ---------------------------------------------------------------------------

/// A successful (2xx) response, undecoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Header names are lower-cased. Repeated headers are joined with `, `.
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Cursor tokens from the `Link` header, empty when there is none.
    pub fn page_info(&self) -> PageInfo {
        self.header("link")
            .map(PageInfo::from_link_header)
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Transport trait
// ---------------------------------------------------------------------------

/// Executes a target and returns the raw 2xx response.
///
/// Non-2xx responses are [`FedicapError::Http`]; failures before a response
/// arrives are [`FedicapError::Transport`]. Both carry the target's method and
/// URL and the given location.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn execute(
        &self,
        target: &Target,
        location: &DebugLocation,
    ) -> Result<RawResponse, FedicapError>;
}

/// Sees every target before it is sent. Cannot modify it.
pub trait RequestInterceptor: Send + Sync {
    fn inspect(&self, target: &Target);
}

/// Decode a response body, attributing failures to `target`.
pub fn decode_response<T: DeserializeOwned>(
    target: &Target,
    response: &RawResponse,
    location: &DebugLocation,
) -> Result<T, FedicapError> {
    decode_json(&response.body).map_err(|failure| FedicapError::Decode {
        failure,
        method: target.method,
        url: target.url(),
        location: location.clone(),
    })
}

/// Execute `target` and decode its body as `T`.
pub async fn execute_and_decode<T: DeserializeOwned>(
    transport: &dyn Transport,
    target: &Target,
    location: &DebugLocation,
) -> Result<T, FedicapError> {
    let response = transport.execute(target, location).await?;
    decode_response(target, &response, location)
}

// ---------------------------------------------------------------------------
// HttpTransport
// ---------------------------------------------------------------------------

/// [`Transport`] over a pooled `reqwest::Client`.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            interceptors: Vec::new(),
        }
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }
}

fn reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(
        &self,
        target: &Target,
        location: &DebugLocation,
    ) -> Result<RawResponse, FedicapError> {
        for interceptor in &self.interceptors {
            interceptor.inspect(target);
        }

        let url = target.url();
        let transport_error = |failure: TransportFailure, url: &Url| FedicapError::Transport {
            failure,
            method: target.method,
            url: url.clone(),
            location: location.clone(),
        };

        let mut request = self
            .client
            .request(reqwest_method(target.method), url.clone())
            .header(ACCEPT, "application/json");
        for (name, value) in &target.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &target.body {
            let encoded = body.encode();
            request = request
                .header(CONTENT_TYPE, encoded.content_type)
                .body(encoded.bytes);
        }

        let started = Instant::now();
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(classify(&e), &url))?;

        let status = response.status().as_u16();
        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in response.headers() {
            let Ok(value) = value.to_str() else {
                continue;
            };
            headers
                .entry(name.as_str().to_ascii_lowercase())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(classify(&e), &url))?
            .to_vec();

        debug!(
            "transport: {} {url} -> {status} ({} bytes in {:?})",
            target.method,
            body.len(),
            started.elapsed()
        );

        if !(200..=299).contains(&status) {
            return Err(FedicapError::Http {
                reason: HttpReason::Status(status),
                body,
                method: target.method,
                url,
                location: location.clone(),
            });
        }

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

// ---------------------------------------------------------------------------
// reqwest error classification
// ---------------------------------------------------------------------------

/// Map a `reqwest` error onto the transport taxonomy.
///
/// `reqwest` does not expose a numeric code, so the error's own predicates
/// are combined with the `io::ErrorKind`s and messages in its source chain.
pub(crate) fn classify(error: &reqwest::Error) -> TransportFailure {
    let mut kinds = Vec::new();
    let mut messages = Vec::new();
    let mut source = error.source();
    while let Some(err) = source {
        if let Some(io_error) = err.downcast_ref::<io::Error>() {
            kinds.push(io_error.kind());
        }
        messages.push(err.to_string().to_ascii_lowercase());
        source = err.source();
    }
    let mentions = |needle: &str| messages.iter().any(|m| m.contains(needle));

    let reason = if error.is_timeout() || kinds.contains(&io::ErrorKind::TimedOut) {
        TransportReason::TimedOut
    } else if error.is_redirect() {
        TransportReason::HttpTooManyRedirects
    } else if error.is_builder() {
        TransportReason::BadUrl
    } else if mentions("dns error") || mentions("failed to lookup address") {
        TransportReason::CannotFindHost
    } else if mentions("certificate") {
        TransportReason::ServerCertificateUntrusted
    } else if mentions("tls") || mentions("ssl") || mentions("handshake") {
        TransportReason::SecureConnectionFailed
    } else if kinds.contains(&io::ErrorKind::ConnectionRefused) {
        TransportReason::CannotConnectToHost
    } else if kinds.iter().any(|kind| {
        matches!(
            kind,
            io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::BrokenPipe
                | io::ErrorKind::UnexpectedEof
        )
    }) {
        TransportReason::NetworkConnectionLost
    } else if kinds.contains(&io::ErrorKind::NotConnected) {
        TransportReason::NotConnectedToInternet
    } else if error.is_connect() {
        TransportReason::CannotConnectToHost
    } else if error.is_decode() {
        TransportReason::CannotDecodeContentData
    } else if error.is_body() {
        TransportReason::NetworkConnectionLost
    } else if error.is_request() {
        TransportReason::BadServerResponse
    } else {
        TransportReason::Unknown(-1)
    };

    TransportFailure::new(reason).with_detail(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let response = RawResponse {
            status: 200,
            headers: BTreeMap::from([(
                "link".to_string(),
                r#"<https://x/?max_id=7>; rel="next""#.to_string(),
            )]),
            body: Vec::new(),
        };
        assert!(response.header("Link").is_some());
        assert_eq!(response.page_info().max_id.as_deref(), Some("7"));
    }

    #[test]
    fn no_link_header_means_no_cursors() {
        assert!(RawResponse::default().page_info().is_empty());
    }

    #[test]
    fn decode_errors_carry_target_metadata() {
        let target = Target::new(
            Url::parse("https://social.example").unwrap(),
            HttpMethod::Get,
            vec!["api".into(), "v1".into(), "instance".into()],
        );
        let response = RawResponse {
            status: 200,
            headers: BTreeMap::new(),
            body: br#"{"uri": 5}"#.to_vec(),
        };
        let location = fedicap::debug_location!();
        let error = decode_response::<fedicap_api::Instance>(&target, &response, &location)
            .unwrap_err();
        assert!(matches!(error, FedicapError::Decode { .. }));
        assert_eq!(error.url().as_str(), "https://social.example/api/v1/instance");
        assert_eq!(error.location(), &location);
    }

    #[tokio::test]
    async fn refused_connection_is_classified() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new(reqwest::Client::new());
        let target = Target::new(
            Url::parse(&format!("http://{addr}")).unwrap(),
            HttpMethod::Get,
            vec!["api".into()],
        );
        let error = transport
            .execute(&target, &fedicap::debug_location!())
            .await
            .unwrap_err();
        let FedicapError::Transport { failure, .. } = error else {
            panic!("expected a transport error, got {error:?}");
        };
        assert_eq!(failure.reason, TransportReason::CannotConnectToHost);
        assert_eq!(failure.code, -1004);
    }
}
