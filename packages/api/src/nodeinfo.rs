//! Server discovery documents: `GET /.well-known/nodeinfo` and the schema
//! document it links to.
//!
//! Discovery is two hops. The well-known path returns a JSON Resource
//! Descriptor ([`Jrd`]) whose links point at one or more versions of the
//! NodeInfo document; the client picks one and fetches a [`NodeInfo`].

use serde::{Deserialize, Serialize};

/// Link relations identifying the NodeInfo schema versions we understand.
///
/// The identifiers sort lexicographically in version order, which is what the
/// discovery client relies on when several are advertised.
pub const SCHEMA_RELS: [&str; 4] = [
    "http://nodeinfo.diaspora.software/ns/schema/1.0",
    "http://nodeinfo.diaspora.software/ns/schema/1.1",
    "http://nodeinfo.diaspora.software/ns/schema/2.0",
    "http://nodeinfo.diaspora.software/ns/schema/2.1",
];

/// A JSON Resource Descriptor as served at `/.well-known/nodeinfo`.
///
/// ```json
/// {
///   "links": [
///     {
///       "rel": "http://nodeinfo.diaspora.software/ns/schema/2.0",
///       "href": "https://social.example/nodeinfo/2.0"
///     }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Jrd {
    #[serde(default)]
    pub links: Vec<JrdLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JrdLink {
    pub rel: String,
    pub href: String,
}

/// The NodeInfo document (any of schema 1.0 through 2.1).
///
/// Only the fields the capability layer needs are modelled. Missing optional
/// fields stay `None` so "unknown" is never confused with zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    #[serde(default)]
    pub open_registrations: bool,

    pub software: Software,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Server software identity from the NodeInfo document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Software {
    /// Software name, e.g. `"mastodon"` or `"akkoma"`.
    pub name: String,

    /// Free-form version string. Often not valid semver.
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_posts: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_comments: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Users>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Users {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_month: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_halfyear: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_rels_sort_in_version_order() {
        let mut sorted = SCHEMA_RELS;
        sorted.sort();
        assert_eq!(sorted, SCHEMA_RELS);
    }

    #[test]
    fn jrd_without_links_is_empty() {
        let jrd: Jrd = serde_json::from_str("{}").unwrap();
        assert!(jrd.links.is_empty());
    }

    #[test]
    fn nodeinfo_missing_usage_stays_unknown() {
        let json = r#"{
            "version": "2.0",
            "software": { "name": "gotosocial", "version": "0.15.0 git-6f7c9b3" },
            "protocols": ["activitypub"],
            "openRegistrations": true
        }"#;
        let info: NodeInfo = serde_json::from_str(json).unwrap();
        assert!(info.open_registrations);
        assert_eq!(info.software.name, "gotosocial");
        assert!(info.usage.is_none());
        assert!(info.software.homepage.is_none());
    }

    #[test]
    fn nodeinfo_partial_usage() {
        let json = r#"{
            "software": { "name": "mastodon", "version": "4.2.1" },
            "openRegistrations": false,
            "usage": { "users": { "total": 12 }, "localPosts": 40 }
        }"#;
        let info: NodeInfo = serde_json::from_str(json).unwrap();
        let usage = info.usage.unwrap();
        assert_eq!(usage.local_posts, Some(40));
        assert_eq!(usage.local_comments, None);
        let users = usage.users.unwrap();
        assert_eq!(users.total, Some(12));
        assert_eq!(users.active_month, None);
    }
}
