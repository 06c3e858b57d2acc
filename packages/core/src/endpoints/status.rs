//! Single-status operations.

use fedicap_api::{Status, Translation, Visibility};
use serde::Serialize;

use super::{bookmarks, reference_since, segments};
use crate::capabilities::{Feature, Flavor};
use crate::endpoint::Endpoint;
use crate::requirements::{CapabilityRequirements, ASSUMED_AVAILABLE};
use crate::target::{HttpMethod, RequestBody};

/// A status to publish.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewStatus {
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_reply_to_id: Option<String>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub spoiler_text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub media_ids: Vec<String>,

    /// Sent as the `Idempotency-Key` header so a retried post is not
    /// duplicated.
    #[serde(skip)]
    pub idempotency_key: Option<String>,
}

impl NewStatus {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEndpoint {
    Get { id: String },
    Post(NewStatus),
    Delete { id: String },
    Reblog { id: String },
    Unreblog { id: String },
    Favourite { id: String },
    Unfavourite { id: String },
    Bookmark { id: String },
    Unbookmark { id: String },
    Pin { id: String },
    Unpin { id: String },
    /// Add an emoji reaction. `emoji` is a unicode emoji or a custom
    /// shortcode.
    React { id: String, emoji: String },
    Unreact { id: String, emoji: String },
}

impl StatusEndpoint {
    fn id(&self) -> Option<&str> {
        match self {
            StatusEndpoint::Post(_) => None,
            StatusEndpoint::Get { id }
            | StatusEndpoint::Delete { id }
            | StatusEndpoint::Reblog { id }
            | StatusEndpoint::Unreblog { id }
            | StatusEndpoint::Favourite { id }
            | StatusEndpoint::Unfavourite { id }
            | StatusEndpoint::Bookmark { id }
            | StatusEndpoint::Unbookmark { id }
            | StatusEndpoint::Pin { id }
            | StatusEndpoint::Unpin { id }
            | StatusEndpoint::React { id, .. }
            | StatusEndpoint::Unreact { id, .. } => Some(id.as_str()),
        }
    }

    fn action(&self) -> Option<&'static str> {
        match self {
            StatusEndpoint::Reblog { .. } => Some("reblog"),
            StatusEndpoint::Unreblog { .. } => Some("unreblog"),
            StatusEndpoint::Favourite { .. } => Some("favourite"),
            StatusEndpoint::Unfavourite { .. } => Some("unfavourite"),
            StatusEndpoint::Bookmark { .. } => Some("bookmark"),
            StatusEndpoint::Unbookmark { .. } => Some("unbookmark"),
            StatusEndpoint::Pin { .. } => Some("pin"),
            StatusEndpoint::Unpin { .. } => Some("unpin"),
            _ => None,
        }
    }
}

/// Emoji reactions live under the pleroma namespace on every flavor that
/// has them.
fn emoji_reactions() -> CapabilityRequirements {
    CapabilityRequirements::minimum_versions([
        (Flavor::Pleroma, ASSUMED_AVAILABLE),
        (Flavor::Akkoma, ASSUMED_AVAILABLE),
    ])
    .or(CapabilityRequirements::feature(
        Feature::EmojiReactions,
        [Flavor::Mastodon, Flavor::Hometown],
    ))
}

impl Endpoint for StatusEndpoint {
    type Output = Status;

    fn path_components(&self) -> Vec<String> {
        match self {
            StatusEndpoint::Post(_) => segments(["statuses"]),
            StatusEndpoint::React { id, emoji } | StatusEndpoint::Unreact { id, emoji } => {
                segments(["pleroma", "statuses", id.as_str(), "reactions", emoji.as_str()])
            }
            other => {
                let mut path = segments(["statuses"]);
                path.extend(other.id().map(str::to_string));
                path.extend(other.action().map(str::to_string));
                path
            }
        }
    }

    fn method(&self) -> HttpMethod {
        match self {
            StatusEndpoint::Get { .. } => HttpMethod::Get,
            StatusEndpoint::Delete { .. } | StatusEndpoint::Unreact { .. } => HttpMethod::Delete,
            StatusEndpoint::React { .. } => HttpMethod::Put,
            _ => HttpMethod::Post,
        }
    }

    fn body(&self) -> Option<RequestBody> {
        match self {
            StatusEndpoint::Post(new_status) => serde_json::to_value(new_status)
                .ok()
                .map(RequestBody::Json),
            _ => None,
        }
    }

    fn headers(&self) -> Vec<(String, String)> {
        match self {
            StatusEndpoint::Post(NewStatus {
                idempotency_key: Some(key),
                ..
            }) => vec![("Idempotency-Key".to_string(), key.clone())],
            _ => Vec::new(),
        }
    }

    fn requires(&self) -> Option<CapabilityRequirements> {
        match self {
            StatusEndpoint::Bookmark { .. } | StatusEndpoint::Unbookmark { .. } => Some(bookmarks()),
            StatusEndpoint::React { .. } | StatusEndpoint::Unreact { .. } => Some(emoji_reactions()),
            _ => None,
        }
    }
}

/// Machine translation of a status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationEndpoint {
    /// `lang` defaults to the user's configured language server-side.
    Translate { id: String, lang: Option<String> },
}

impl Endpoint for TranslationEndpoint {
    type Output = Translation;

    fn path_components(&self) -> Vec<String> {
        let TranslationEndpoint::Translate { id, .. } = self;
        segments(["statuses", id.as_str(), "translate"])
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn body(&self) -> Option<RequestBody> {
        let TranslationEndpoint::Translate { lang, .. } = self;
        lang.as_ref()
            .map(|lang| RequestBody::Json(serde_json::json!({ "lang": lang })))
    }

    fn requires(&self) -> Option<CapabilityRequirements> {
        Some(
            CapabilityRequirements::minimum_versions(reference_since(4, 0, 0)).or(
                CapabilityRequirements::feature(Feature::Translation, [Flavor::Akkoma]),
            ),
        )
    }
}
