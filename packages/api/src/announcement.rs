//! Instance announcements.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Announcement {
    pub id: String,

    /// HTML content.
    pub content: String,

    #[serde(default)]
    pub published_at: Option<String>,

    #[serde(default)]
    pub read: Option<bool>,
}
