//! Statuses, media attachments, translations and reports.

use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::tag::Tag;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Unlisted,
    Private,
    Direct,
    /// Local-only posts (forks only).
    Local,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Unlisted => "unlisted",
            Visibility::Private => "private",
            Visibility::Direct => "direct",
            Visibility::Local => "local",
        }
    }
}

/// A status (post).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Status {
    pub id: String,

    #[serde(default)]
    pub uri: String,

    #[serde(default)]
    pub url: Option<String>,

    pub account: Account,

    /// HTML content. Rendering is the caller's concern.
    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub visibility: Visibility,

    #[serde(default)]
    pub sensitive: bool,

    #[serde(default)]
    pub spoiler_text: String,

    #[serde(default)]
    pub language: Option<String>,

    #[serde(default)]
    pub in_reply_to_id: Option<String>,

    #[serde(default)]
    pub in_reply_to_account_id: Option<String>,

    #[serde(default)]
    pub reblog: Option<Box<Status>>,

    #[serde(default)]
    pub media_attachments: Vec<Attachment>,

    #[serde(default)]
    pub tags: Vec<Tag>,

    #[serde(default)]
    pub reblogs_count: u64,

    #[serde(default)]
    pub favourites_count: u64,

    #[serde(default)]
    pub replies_count: u64,

    #[serde(default)]
    pub favourited: Option<bool>,

    #[serde(default)]
    pub reblogged: Option<bool>,

    #[serde(default)]
    pub bookmarked: Option<bool>,

    #[serde(default)]
    pub pinned: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentType {
    Image,
    Gifv,
    Video,
    Audio,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A media attachment, also returned by the upload endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
    pub id: String,

    #[serde(rename = "type", default)]
    pub attachment_type: AttachmentType,

    /// `null` while the server is still processing an upload.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub preview_url: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub blurhash: Option<String>,
}

/// Machine translation of a status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Translation {
    pub content: String,

    #[serde(default)]
    pub detected_source_language: Option<String>,

    #[serde(default)]
    pub provider: Option<String>,
}

/// A filed report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Report {
    pub id: String,

    #[serde(default)]
    pub action_taken: bool,

    #[serde(default)]
    pub comment: String,
}
