//! Hashtags.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub name: String,

    #[serde(default)]
    pub url: String,

    /// Daily usage, newest first. Only present on trending and tag lookups.
    #[serde(default)]
    pub history: Vec<TagHistory>,

    /// Absent on servers without followed-tag support.
    #[serde(default)]
    pub following: Option<bool>,
}

/// Usage statistics for one day. Counts arrive as strings on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagHistory {
    pub day: String,
    pub uses: String,
    pub accounts: String,
}
