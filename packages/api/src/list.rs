//! User-defined timelines.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct List {
    pub id: String,
    pub title: String,

    /// `followed`, `list` or `none`. Not sent by older servers.
    #[serde(default)]
    pub replies_policy: Option<String>,
}
