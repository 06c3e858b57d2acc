//! Accounts and relationships.

use serde::{Deserialize, Serialize};

/// A user account as returned by `/api/v1/accounts/*`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: String,
    pub username: String,

    /// `user` for local accounts, `user@domain` for remote ones.
    pub acct: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub note: String,

    #[serde(default)]
    pub avatar: Option<String>,

    #[serde(default)]
    pub locked: bool,

    #[serde(default)]
    pub bot: bool,

    #[serde(default)]
    pub followers_count: u64,

    #[serde(default)]
    pub following_count: u64,

    #[serde(default)]
    pub statuses_count: u64,

    #[serde(default)]
    pub fields: Vec<Field>,

    #[serde(default)]
    pub created_at: Option<String>,
}

/// A profile metadata field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub verified_at: Option<String>,
}

/// Relationship between the authenticated account and another account.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    #[serde(default)]
    pub following: bool,
    #[serde(default)]
    pub followed_by: bool,
    #[serde(default)]
    pub requested: bool,
    #[serde(default)]
    pub blocking: bool,
    #[serde(default)]
    pub muting: bool,
    #[serde(default)]
    pub showing_reblogs: bool,
    #[serde(default)]
    pub note: String,
}

/// Accounts you follow that also follow a given account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FamiliarFollowers {
    pub id: String,
    #[serde(default)]
    pub accounts: Vec<Account>,
}
