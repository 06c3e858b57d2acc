//! Cursor pagination via the `Link` response header.
//!
//! Collection endpoints return a header such as
//!
//! ```text
//! Link: <https://social.example/api/v1/timelines/home?max_id=109>; rel="next",
//!       <https://social.example/api/v1/timelines/home?min_id=114>; rel="prev"
//! ```
//!
//! The `max_id` / `min_id` / `since_id` values are opaque tokens. They are
//! lifted out of those URLs in their wire form, still percent-encoded, and
//! written back byte for byte on the next request. The client never decodes,
//! re-encodes or reorders them.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::target::Target;

/// Cursor tokens extracted from one response, exactly as they appear in the
/// `Link` URL's query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub max_id: Option<String>,
    pub min_id: Option<String>,
    pub since_id: Option<String>,
}

impl PageInfo {
    /// Extract cursors from a `Link` header value.
    ///
    /// Every `<url>` entry is considered regardless of its `rel`. The first
    /// occurrence of each cursor name wins. URLs that fail to parse are
    /// skipped; a missing cursor means there is no page in that direction.
    pub fn from_link_header(value: &str) -> Self {
        let mut info = PageInfo::default();
        for caps in LINK_URL_RE.captures_iter(value) {
            let Ok(url) = Url::parse(&caps[1]) else {
                continue;
            };
            let Some(query) = url.query() else {
                continue;
            };
            for pair in query.split('&') {
                let (name, token) = pair.split_once('=').unwrap_or((pair, ""));
                let slot = match name {
                    "max_id" => &mut info.max_id,
                    "min_id" => &mut info.min_id,
                    "since_id" => &mut info.since_id,
                    _ => continue,
                };
                if slot.is_none() {
                    *slot = Some(token.to_string());
                }
            }
        }
        info
    }

    pub fn is_empty(&self) -> bool {
        self.max_id.is_none() && self.min_id.is_none() && self.since_id.is_none()
    }
}

/// `<...>` entries of a Link header.
static LINK_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^>]*)>").expect("invalid link header regex"));

/// A decoded page together with the cursors of the response it came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub result: T,
    pub info: PageInfo,
}

impl<T> PagedResult<T> {
    /// A page with no further cursors in either direction.
    pub fn terminal(result: T) -> Self {
        Self {
            result,
            info: PageInfo::default(),
        }
    }
}

/// Request-side cursors for a paged call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paging {
    pub max_id: Option<String>,
    pub min_id: Option<String>,
    pub since_id: Option<String>,
    pub limit: Option<u32>,
}

impl Paging {
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }

    /// Paging that continues past the oldest item of `info`'s page, keeping
    /// the limit. `None` when the response carried no `max_id`.
    pub fn older(&self, info: &PageInfo) -> Option<Paging> {
        info.max_id.as_ref().map(|max_id| Paging {
            max_id: Some(max_id.clone()),
            min_id: None,
            since_id: None,
            limit: self.limit,
        })
    }

    /// Paging for items newer than `info`'s page, keeping the limit.
    pub fn newer(&self, info: &PageInfo) -> Option<Paging> {
        info.min_id.as_ref().map(|min_id| Paging {
            max_id: None,
            min_id: Some(min_id.clone()),
            since_id: None,
            limit: self.limit,
        })
    }

    /// Cursor pairs in wire form, tokens copied unchanged.
    pub fn cursor_items(&self) -> Vec<(String, String)> {
        [
            ("max_id", &self.max_id),
            ("min_id", &self.min_id),
            ("since_id", &self.since_id),
        ]
        .into_iter()
        .filter_map(|(name, token)| token.as_ref().map(|t| (name.to_string(), t.clone())))
        .collect()
    }

    /// Add the limit and the cursors to `target`. Cursors bypass query
    /// encoding so the server gets back the bytes it sent.
    pub fn apply(&self, target: Target) -> Target {
        let limit = self.limit.map(|limit| ("limit".to_string(), limit.to_string()));
        target
            .with_query(limit)
            .with_encoded_query(self.cursor_items())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_next_and_prev_cursors() {
        let info = PageInfo::from_link_header(
            r#"<https://x/?max_id=7>; rel="next", <https://x/?min_id=2>; rel="prev""#,
        );
        assert_eq!(
            info,
            PageInfo {
                max_id: Some("7".into()),
                min_id: Some("2".into()),
                since_id: None,
            }
        );
    }

    #[test]
    fn first_match_wins() {
        let info = PageInfo::from_link_header(
            "<https://x/a?max_id=first>; rel=\"next\", <https://x/b?max_id=second&since_id=9>; rel=\"other\"",
        );
        assert_eq!(info.max_id.as_deref(), Some("first"));
        assert_eq!(info.since_id.as_deref(), Some("9"));
    }

    #[test]
    fn opaque_tokens_survive_unchanged() {
        let info = PageInfo::from_link_header(
            r#"<https://gts.example/api/v1/timelines/home?limit=20&max_id=01HQ7ZP3K8Y4X9V2B6N1M5C0DE>; rel="next""#,
        );
        assert_eq!(info.max_id.as_deref(), Some("01HQ7ZP3K8Y4X9V2B6N1M5C0DE"));
    }

    #[test]
    fn missing_or_garbled_header_means_no_cursors() {
        assert!(PageInfo::from_link_header("").is_empty());
        assert!(PageInfo::from_link_header("<not a url>; rel=\"next\"").is_empty());
        assert!(PageInfo::from_link_header("<https://x/?page=2>; rel=\"next\"").is_empty());
    }

    #[test]
    fn tokens_keep_their_wire_form() {
        let info = PageInfo::from_link_header(
            r#"<https://x/?max_id=AbC%2B109&min_id=a~b&since_id=2024-01-01T00:00:00Z>; rel="next""#,
        );
        assert_eq!(info.max_id.as_deref(), Some("AbC%2B109"));
        assert_eq!(info.min_id.as_deref(), Some("a~b"));
        assert_eq!(info.since_id.as_deref(), Some("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn older_paging_replays_max_id_verbatim() {
        let info = PageInfo::from_link_header(r#"<https://x/?max_id=7>; rel="next""#);
        let paging = Paging::with_limit(40).older(&info).unwrap();
        assert_eq!(
            paging.cursor_items(),
            vec![("max_id".to_string(), "7".to_string())]
        );
        assert_eq!(paging.limit, Some(40));
    }

    #[test]
    fn applied_cursors_are_written_byte_for_byte() {
        let base = Url::parse("https://social.example/api/v1/timelines/home").unwrap();
        for token in ["a~b", "2024-01-01T00:00:00Z", "cursor%2B104"] {
            let link = format!("<https://x/?max_id={token}>; rel=\"next\"");
            let info = PageInfo::from_link_header(&link);
            let paging = Paging::with_limit(20).older(&info).unwrap();
            let target = paging.apply(Target::new(
                base.clone(),
                crate::target::HttpMethod::Get,
                Vec::new(),
            ));
            assert_eq!(
                target.url().query(),
                Some(format!("limit=20&max_id={token}").as_str())
            );
        }
    }

    #[test]
    fn no_max_id_means_no_older_page() {
        let info = PageInfo::from_link_header(r#"<https://x/?min_id=2>; rel="prev""#);
        assert!(Paging::default().older(&info).is_none());
        assert_eq!(
            Paging::default().newer(&info).unwrap().min_id.as_deref(),
            Some("2")
        );
    }
}
