//! NodeInfo discovery, the pure half.
//!
//! The client fetches `/.well-known/nodeinfo`, hands the [`Jrd`] to
//! [`select_schema_link`], fetches the returned URL and feeds the
//! [`NodeInfo`](fedicap_api::NodeInfo) software block to
//! [`ApiCapabilities::from_software`](crate::ApiCapabilities::from_software).

use fedicap_api::nodeinfo::SCHEMA_RELS;
use fedicap_api::Jrd;
use url::Url;

use crate::error::DiscoveryFailure;

/// Path components of the well-known discovery document.
pub const WELL_KNOWN_NODEINFO: [&str; 2] = [".well-known", "nodeinfo"];

/// Pick the NodeInfo document to fetch.
///
/// Links with a recognised schema `rel` are candidates; the greatest `rel`
/// string wins, which is the newest schema version. The winning link must be
/// an absolute `https` URL. Older links are not tried when the newest one is
/// unusable.
pub fn select_schema_link(jrd: &Jrd) -> Result<Url, DiscoveryFailure> {
    let link = jrd
        .links
        .iter()
        .filter(|link| SCHEMA_RELS.contains(&link.rel.as_str()))
        .max_by(|a, b| a.rel.cmp(&b.rel))
        .ok_or(DiscoveryFailure::NoSupportedSchemaVersionsInDocument)?;

    let url = Url::parse(&link.href).map_err(|_| DiscoveryFailure::InvalidLinkUrl {
        href: link.href.clone(),
    })?;
    if url.scheme() != "https" {
        return Err(DiscoveryFailure::ProtocolNotSupported {
            scheme: url.scheme().to_string(),
        });
    }
    Ok(url)
}
