//! The closed error taxonomy.
//!
//! Every failure a call can produce is one [`FedicapError`] variant, and
//! every variant carries the request method, URL and the [`DebugLocation`]
//! of the call site. Errors serialize to a JSON diagnostic blob so a user
//! can attach it to a bug report.

use std::collections::BTreeSet;
use std::fmt;

use fedicap_api::ApiErrorBody;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use url::Url;

use crate::capabilities::ApiCapabilities;
use crate::location::DebugLocation;
use crate::target::HttpMethod;

/// Response bodies in diagnostics are cut at this many bytes.
const DIAGNOSTIC_BODY_LIMIT: usize = 4096;

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Why a request failed before an HTTP response was received.
///
/// Each reason has a conventional numeric code. Codes we do not recognise
/// are kept in [`TransportReason::Unknown`] rather than dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportReason {
    Unknown(i64),
    Cancelled,
    BadUrl,
    TimedOut,
    UnsupportedUrl,
    CannotFindHost,
    CannotConnectToHost,
    NetworkConnectionLost,
    DnsLookupFailed,
    HttpTooManyRedirects,
    ResourceUnavailable,
    NotConnectedToInternet,
    RedirectToNonExistentLocation,
    BadServerResponse,
    UserCancelledAuthentication,
    UserAuthenticationRequired,
    ZeroByteResource,
    CannotDecodeRawData,
    CannotDecodeContentData,
    CannotParseResponse,
    InternationalRoamingOff,
    CallIsActive,
    DataNotAllowed,
    RequestBodyStreamExhausted,
    SecureConnectionRequired,
    FileDoesNotExist,
    FileIsDirectory,
    NoPermissionsToReadFile,
    DataLengthExceedsMaximum,
    SecureConnectionFailed,
    ServerCertificateHasBadDate,
    ServerCertificateUntrusted,
    ServerCertificateHasUnknownRoot,
    ServerCertificateNotYetValid,
    ClientCertificateRejected,
    ClientCertificateRequired,
    CannotLoadFromNetwork,
    BackgroundSessionRequiresSharedContainer,
    BackgroundSessionInUseByAnotherProcess,
    BackgroundSessionWasDisconnected,
}

/// `(reason, code)` for every named reason.
const TRANSPORT_CODES: [(TransportReason, i64); 39] = [
    (TransportReason::Cancelled, -999),
    (TransportReason::BadUrl, -1000),
    (TransportReason::TimedOut, -1001),
    (TransportReason::UnsupportedUrl, -1002),
    (TransportReason::CannotFindHost, -1003),
    (TransportReason::CannotConnectToHost, -1004),
    (TransportReason::NetworkConnectionLost, -1005),
    (TransportReason::DnsLookupFailed, -1006),
    (TransportReason::HttpTooManyRedirects, -1007),
    (TransportReason::ResourceUnavailable, -1008),
    (TransportReason::NotConnectedToInternet, -1009),
    (TransportReason::RedirectToNonExistentLocation, -1010),
    (TransportReason::BadServerResponse, -1011),
    (TransportReason::UserCancelledAuthentication, -1012),
    (TransportReason::UserAuthenticationRequired, -1013),
    (TransportReason::ZeroByteResource, -1014),
    (TransportReason::CannotDecodeRawData, -1015),
    (TransportReason::CannotDecodeContentData, -1016),
    (TransportReason::CannotParseResponse, -1017),
    (TransportReason::InternationalRoamingOff, -1018),
    (TransportReason::CallIsActive, -1019),
    (TransportReason::DataNotAllowed, -1020),
    (TransportReason::RequestBodyStreamExhausted, -1021),
    (TransportReason::SecureConnectionRequired, -1022),
    (TransportReason::FileDoesNotExist, -1100),
    (TransportReason::FileIsDirectory, -1101),
    (TransportReason::NoPermissionsToReadFile, -1102),
    (TransportReason::DataLengthExceedsMaximum, -1103),
    (TransportReason::SecureConnectionFailed, -1200),
    (TransportReason::ServerCertificateHasBadDate, -1201),
    (TransportReason::ServerCertificateUntrusted, -1202),
    (TransportReason::ServerCertificateHasUnknownRoot, -1203),
    (TransportReason::ServerCertificateNotYetValid, -1204),
    (TransportReason::ClientCertificateRejected, -1205),
    (TransportReason::ClientCertificateRequired, -1206),
    (TransportReason::CannotLoadFromNetwork, -2000),
    (TransportReason::BackgroundSessionRequiresSharedContainer, -995),
    (TransportReason::BackgroundSessionInUseByAnotherProcess, -996),
    (TransportReason::BackgroundSessionWasDisconnected, -997),
];

impl TransportReason {
    /// Map a numeric code. Never fails: unrecognised codes become `Unknown`.
    pub fn from_code(code: i64) -> Self {
        TRANSPORT_CODES
            .iter()
            .find(|(_, c)| *c == code)
            .map(|(reason, _)| *reason)
            .unwrap_or(TransportReason::Unknown(code))
    }

    pub fn code(&self) -> i64 {
        match self {
            TransportReason::Unknown(code) => *code,
            named => TRANSPORT_CODES
                .iter()
                .find(|(reason, _)| reason == named)
                .map(|(_, code)| *code)
                .unwrap_or(-1),
        }
    }
}

/// Why a backgrounded request was cancelled by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundCancellation {
    UserForceQuitApplication,
    BackgroundUpdatesDisabled,
    InsufficientSystemResources,
}

/// Why a network that exists was not usable for this request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkUnavailable {
    Cellular,
    Expensive,
    Constrained,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportFailure {
    pub reason: TransportReason,
    pub code: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_cancellation: Option<BackgroundCancellation>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub network_unavailable: BTreeSet<NetworkUnavailable>,

    /// The underlying error message, if there was one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl TransportFailure {
    pub fn new(reason: TransportReason) -> Self {
        Self {
            reason,
            code: reason.code(),
            background_cancellation: None,
            network_unavailable: BTreeSet::new(),
            detail: None,
        }
    }

    pub fn from_code(code: i64) -> Self {
        Self::new(TransportReason::from_code(code))
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_background_cancellation(mut self, reason: BackgroundCancellation) -> Self {
        self.background_cancellation = Some(reason);
        self
    }

    pub fn with_network_unavailable(
        mut self,
        reasons: impl IntoIterator<Item = NetworkUnavailable>,
    ) -> Self {
        self.network_unavailable.extend(reasons);
        self
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            TransportReason::Unknown(code) => write!(f, "unknown transport error (code {code})")?,
            reason => write!(f, "{reason:?} (code {})", self.code)?,
        }
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HttpReason {
    /// A well-formed response outside 200..=299.
    Status(u16),
    /// Something came back that was not an HTTP response.
    NonHttpResponse,
}

impl fmt::Display for HttpReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpReason::Status(code) => write!(f, "status {code}"),
            HttpReason::NonHttpResponse => f.write_str("non-HTTP response"),
        }
    }
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// One level of the path to the value that failed to decode.
///
/// serde does not report the Rust type expected at each level, so the
/// segment records what the body actually held there. Only the outermost
/// expected type survives, as [`DecodeFailure::type_name`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodingPathSegment {
    /// Object key, array index, or enum variant.
    pub key: String,
    /// JSON type present in the body at this level (`object`, `array`,
    /// `string`, `number`, `bool`, `null`), or `missing` when the key is
    /// absent.
    pub found_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeFailure {
    /// The Rust type we tried to decode into.
    pub type_name: String,
    pub path: Vec<CodingPathSegment>,
    pub description: String,
}

impl DecodeFailure {
    /// `a.b[2].c` style rendering of the path.
    pub fn path_string(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            if segment.key.parse::<usize>().is_ok() {
                out.push_str(&format!("[{}]", segment.key));
            } else {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(&segment.key);
            }
        }
        out
    }
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path_string();
        if path.is_empty() {
            write!(f, "decoding {}: {}", self.type_name, self.description)
        } else {
            write!(f, "decoding {} at {path}: {}", self.type_name, self.description)
        }
    }
}

/// Decode a JSON body into `T`, recording where decoding failed.
///
/// An empty body decodes as `{}`.
pub fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeFailure> {
    let type_name = std::any::type_name::<T>().to_string();
    let value: serde_json::Value = if bytes.iter().all(u8::is_ascii_whitespace) {
        serde_json::Value::Object(Default::default())
    } else {
        serde_json::from_slice(bytes).map_err(|e| DecodeFailure {
            type_name: type_name.clone(),
            path: Vec::new(),
            description: format!("invalid JSON: {e}"),
        })?
    };

    serde_path_to_error::deserialize(&value).map_err(|e| {
        let mut current = Some(&value);
        let path = e
            .path()
            .iter()
            .map(|segment| {
                use serde_path_to_error::Segment;
                let (key, next) = match segment {
                    Segment::Seq { index } => {
                        (index.to_string(), current.and_then(|v| v.get(*index)))
                    }
                    Segment::Map { key } => (key.clone(), current.and_then(|v| v.get(key))),
                    Segment::Enum { variant } => (variant.clone(), current),
                    Segment::Unknown => ("?".to_string(), None),
                };
                current = next;
                CodingPathSegment {
                    key,
                    found_type: current.map_or("missing", json_type_name).to_string(),
                }
            })
            .collect();
        DecodeFailure {
            type_name,
            path,
            description: e.inner().to_string(),
        }
    })
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DiscoveryFailure {
    #[error("discovery document uses unsupported protocol {scheme:?}; only https is allowed")]
    ProtocolNotSupported { scheme: String },

    #[error("discovery document advertises no supported NodeInfo schema version")]
    NoSupportedSchemaVersionsInDocument,

    #[error("discovery document links to an invalid URL {href:?}")]
    InvalidLinkUrl { href: String },
}

// ---------------------------------------------------------------------------
// FedicapError
// ---------------------------------------------------------------------------

/// Every way a call can fail.
#[derive(Debug, Clone, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FedicapError {
    #[error("{method} {url} failed: {failure}")]
    Transport {
        failure: TransportFailure,
        method: HttpMethod,
        url: Url,
        location: DebugLocation,
    },

    #[error("{method} {url} failed: {reason}")]
    Http {
        reason: HttpReason,
        #[serde(serialize_with = "serialize_body")]
        body: Vec<u8>,
        method: HttpMethod,
        url: Url,
        location: DebugLocation,
    },

    #[error("{method} {url}: {failure}")]
    Decode {
        failure: DecodeFailure,
        method: HttpMethod,
        url: Url,
        location: DebugLocation,
    },

    #[error("{method} {url} is not available on {capabilities}")]
    ApiNotAvailable {
        capabilities: ApiCapabilities,
        method: HttpMethod,
        url: Url,
        location: DebugLocation,
    },

    #[error("{method} {url} failed with status {status}: {}", fmt_api_error(.error))]
    Annotated {
        error: ApiErrorBody,
        status: u16,
        capabilities: ApiCapabilities,
        method: HttpMethod,
        url: Url,
        location: DebugLocation,
    },

    #[error("discovery via {url} failed: {failure}")]
    Discovery {
        failure: DiscoveryFailure,
        method: HttpMethod,
        url: Url,
        location: DebugLocation,
    },
}

fn fmt_api_error(error: &ApiErrorBody) -> String {
    match &error.error_description {
        Some(description) => format!("{} ({description})", error.error),
        None => error.error.clone(),
    }
}

fn serialize_body<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    let end = body.len().min(DIAGNOSTIC_BODY_LIMIT);
    serializer.serialize_str(&String::from_utf8_lossy(&body[..end]))
}

impl FedicapError {
    pub fn method(&self) -> HttpMethod {
        match self {
            FedicapError::Transport { method, .. }
            | FedicapError::Http { method, .. }
            | FedicapError::Decode { method, .. }
            | FedicapError::ApiNotAvailable { method, .. }
            | FedicapError::Annotated { method, .. }
            | FedicapError::Discovery { method, .. } => *method,
        }
    }

    pub fn url(&self) -> &Url {
        match self {
            FedicapError::Transport { url, .. }
            | FedicapError::Http { url, .. }
            | FedicapError::Decode { url, .. }
            | FedicapError::ApiNotAvailable { url, .. }
            | FedicapError::Annotated { url, .. }
            | FedicapError::Discovery { url, .. } => url,
        }
    }

    pub fn location(&self) -> &DebugLocation {
        match self {
            FedicapError::Transport { location, .. }
            | FedicapError::Http { location, .. }
            | FedicapError::Decode { location, .. }
            | FedicapError::ApiNotAvailable { location, .. }
            | FedicapError::Annotated { location, .. }
            | FedicapError::Discovery { location, .. } => location,
        }
    }

    /// HTTP status, for the kinds that received a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            FedicapError::Http {
                reason: HttpReason::Status(status),
                ..
            }
            | FedicapError::Annotated { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the failure should be reported without an intrusive alert.
    ///
    /// Only network hiccups on safe requests are quiet. Quiet errors are
    /// still returned to the caller.
    pub fn is_quiet(&self) -> bool {
        match self {
            FedicapError::Transport {
                failure, method, ..
            } => {
                method.is_safe()
                    && matches!(
                        failure.reason,
                        TransportReason::Cancelled | TransportReason::TimedOut
                    )
            }
            FedicapError::Http { method, .. } => method.is_safe(),
            FedicapError::Decode { .. }
            | FedicapError::ApiNotAvailable { .. }
            | FedicapError::Annotated { .. }
            | FedicapError::Discovery { .. } => false,
        }
    }

    /// Structured diagnostic for bug reports: the serialized error plus a
    /// human-readable `description`.
    pub fn diagnostic(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}));
        if let Some(object) = value.as_object_mut() {
            object.insert(
                "description".to_string(),
                serde_json::Value::String(self.to_string()),
            );
        }
        value
    }

    pub fn diagnostic_json(&self) -> String {
        serde_json::to_string_pretty(&self.diagnostic()).unwrap_or_else(|_| self.to_string())
    }
}
