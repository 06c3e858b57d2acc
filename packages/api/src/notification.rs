//! Notifications.

use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::status::Status;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Mention,
    Status,
    Reblog,
    Follow,
    FollowRequest,
    Favourite,
    Poll,
    Update,
    /// Emoji reaction notifications on Pleroma-derived servers.
    #[serde(rename = "pleroma:emoji_reaction")]
    EmojiReaction,
    #[serde(other)]
    Unknown,
}

impl NotificationType {
    /// Query-string name for `types[]` / `exclude_types[]`.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Mention => "mention",
            NotificationType::Status => "status",
            NotificationType::Reblog => "reblog",
            NotificationType::Follow => "follow",
            NotificationType::FollowRequest => "follow_request",
            NotificationType::Favourite => "favourite",
            NotificationType::Poll => "poll",
            NotificationType::Update => "update",
            NotificationType::EmojiReaction => "pleroma:emoji_reaction",
            NotificationType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: String,

    #[serde(rename = "type")]
    pub notification_type: NotificationType,

    #[serde(default)]
    pub created_at: String,

    pub account: Account,

    #[serde(default)]
    pub status: Option<Status>,
}
