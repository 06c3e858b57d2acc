//! Paged status collections: timelines, favourites, bookmarks, trends.

use fedicap_api::Status;

use super::{bookmarks, reference_since, segments};
use crate::capabilities::{Feature, Flavor};
use crate::endpoint::{Endpoint, PagedEndpoint};
use crate::requirements::CapabilityRequirements;
use crate::target::HttpMethod;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusesEndpoint {
    PublicTimeline {
        local: bool,
    },
    HomeTimeline,
    TagTimeline {
        tag: String,
    },
    ListTimeline {
        id: String,
    },
    AccountStatuses {
        id: String,
        exclude_replies: bool,
        only_media: bool,
    },
    Favourites,
    Bookmarks,
    /// Posts from a curated set of neighbouring instances (akkoma).
    BubbleTimeline,
    TrendingStatuses,
}

impl Endpoint for StatusesEndpoint {
    type Output = Vec<Status>;

    fn path_components(&self) -> Vec<String> {
        match self {
            StatusesEndpoint::PublicTimeline { .. } => segments(["timelines", "public"]),
            StatusesEndpoint::HomeTimeline => segments(["timelines", "home"]),
            StatusesEndpoint::TagTimeline { tag } => segments(["timelines", "tag", tag.as_str()]),
            StatusesEndpoint::ListTimeline { id } => segments(["timelines", "list", id.as_str()]),
            StatusesEndpoint::AccountStatuses { id, .. } => segments(["accounts", id.as_str(), "statuses"]),
            StatusesEndpoint::Favourites => segments(["favourites"]),
            StatusesEndpoint::Bookmarks => segments(["bookmarks"]),
            StatusesEndpoint::BubbleTimeline => segments(["timelines", "bubble"]),
            StatusesEndpoint::TrendingStatuses => segments(["trends", "statuses"]),
        }
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn query_items(&self) -> Vec<(String, String)> {
        match self {
            StatusesEndpoint::PublicTimeline { local: true } => {
                vec![("local".into(), "true".into())]
            }
            StatusesEndpoint::AccountStatuses {
                exclude_replies,
                only_media,
                ..
            } => {
                let mut items = Vec::new();
                if *exclude_replies {
                    items.push(("exclude_replies".into(), "true".into()));
                }
                if *only_media {
                    items.push(("only_media".into(), "true".into()));
                }
                items
            }
            _ => Vec::new(),
        }
    }

    fn requires(&self) -> Option<CapabilityRequirements> {
        match self {
            StatusesEndpoint::Bookmarks => Some(bookmarks()),
            StatusesEndpoint::BubbleTimeline => Some(CapabilityRequirements::feature(
                Feature::BubbleTimeline,
                [Flavor::Akkoma],
            )),
            StatusesEndpoint::TrendingStatuses => Some(CapabilityRequirements::minimum_versions(
                reference_since(3, 5, 0),
            )),
            _ => None,
        }
    }

    fn fallback(&self) -> Option<Vec<Status>> {
        match self {
            StatusesEndpoint::Bookmarks
            | StatusesEndpoint::BubbleTimeline
            | StatusesEndpoint::TrendingStatuses => Some(Vec::new()),
            _ => None,
        }
    }
}

impl PagedEndpoint for StatusesEndpoint {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::ApiCapabilities;
    use crate::endpoints::test_support::url_of;

    #[test]
    fn timeline_urls() {
        assert_eq!(
            url_of(&StatusesEndpoint::PublicTimeline { local: true }),
            "https://social.example/api/v1/timelines/public?local=true"
        );
        assert_eq!(
            url_of(&StatusesEndpoint::PublicTimeline { local: false }),
            "https://social.example/api/v1/timelines/public"
        );
        assert_eq!(
            url_of(&StatusesEndpoint::TagTimeline { tag: "rust".into() }),
            "https://social.example/api/v1/timelines/tag/rust"
        );
        assert_eq!(
            url_of(&StatusesEndpoint::AccountStatuses {
                id: "42".into(),
                exclude_replies: true,
                only_media: false,
            }),
            "https://social.example/api/v1/accounts/42/statuses?exclude_replies=true"
        );
    }

    #[test]
    fn bubble_timeline_needs_akkoma_feature() {
        let akkoma = ApiCapabilities::from_parts("akkoma", "3.10.4");
        assert!(!StatusesEndpoint::BubbleTimeline.supported_by(&akkoma));
        assert!(StatusesEndpoint::BubbleTimeline
            .supported_by(&akkoma.with_features([Feature::BubbleTimeline])));

        let mastodon = ApiCapabilities::from_parts("mastodon", "4.2.0")
            .with_features([Feature::BubbleTimeline]);
        assert!(!StatusesEndpoint::BubbleTimeline.supported_by(&mastodon));
    }

    #[test]
    fn optional_timelines_fall_back_to_empty() {
        for endpoint in [
            StatusesEndpoint::Bookmarks,
            StatusesEndpoint::BubbleTimeline,
            StatusesEndpoint::TrendingStatuses,
        ] {
            assert_eq!(endpoint.fallback(), Some(vec![]));
        }
        assert_eq!(StatusesEndpoint::HomeTimeline.fallback(), None);
        assert!(StatusesEndpoint::HomeTimeline.requires().is_none());
    }
}
