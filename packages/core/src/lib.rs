//! Capability layer for the family of Fediverse server APIs.
//!
//! Servers in this family share a wire contract but diverge in which
//! endpoints they support, from which version, and how faithfully they follow
//! the documented schema. This crate answers, without touching the network,
//! "can I call this operation against this server, and if not, what do I use
//! instead?"
//!
//! This crate has **no I/O**: no HTTP client and no async runtime. The
//! `fedicap-client` crate executes the [`Target`]s built here and feeds
//! responses back through [`decode_json`] and [`PageInfo::from_link_header`].
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`location`] | [`DebugLocation`] and the [`debug_location!`] macro |
//! | [`version`] | Strict and relaxed version parsing |
//! | [`capabilities`] | [`ApiCapabilities`], [`Flavor`], [`Feature`], [`CompatibilityMode`] |
//! | [`requirements`] | Per-endpoint minimum version tables and the `or` combinator |
//! | [`target`] | Abstract request description, URL and body encoding |
//! | [`paging`] | Cursor extraction from `Link` headers |
//! | [`discovery`] | NodeInfo schema link selection |
//! | [`error`] | The closed error taxonomy |
//! | [`endpoint`] / [`endpoints`] | The endpoint trait and the catalog |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use fedicap::endpoints::StatusesEndpoint;
//! use fedicap::{ApiCapabilities, Endpoint};
//!
//! let caps = ApiCapabilities::from_parts("mastodon", "4.2.1");
//! let endpoint = StatusesEndpoint::TrendingStatuses;
//! if endpoint.requires().map_or(true, |r| r.satisfied_by(&caps)) {
//!     // safe to call
//! }
//! ```

pub mod capabilities;
pub mod discovery;
pub mod endpoint;
pub mod endpoints;
pub mod error;
pub mod location;
pub mod paging;
pub mod requirements;
pub mod target;
pub mod version;

pub use capabilities::{ApiCapabilities, CompatibilityMode, Feature, Flavor};
pub use endpoint::{Endpoint, PagedEndpoint};
pub use error::{
    decode_json, BackgroundCancellation, CodingPathSegment, DecodeFailure, DiscoveryFailure,
    FedicapError, HttpReason, NetworkUnavailable, TransportFailure, TransportReason,
};
pub use location::DebugLocation;
pub use paging::{PageInfo, PagedResult, Paging};
pub use requirements::{CapabilityRequirements, RequirementPath, ASSUMED_AVAILABLE};
pub use target::{HttpMethod, MultipartField, RequestBody, Target};

pub use semver::Version;
