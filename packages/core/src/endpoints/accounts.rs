//! Accounts, relationships and account collections.

use fedicap_api::{Account, FamiliarFollowers, Relationship};

use super::{array_query, reference_since, segments};
use crate::endpoint::{Endpoint, PagedEndpoint};
use crate::requirements::CapabilityRequirements;
use crate::target::HttpMethod;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountEndpoint {
    Get { id: String },
    /// The account the access token belongs to.
    VerifyCredentials,
    /// Resolve `user` or `user@domain` to an account.
    Lookup { acct: String },
}

impl Endpoint for AccountEndpoint {
    type Output = Account;

    fn path_components(&self) -> Vec<String> {
        match self {
            AccountEndpoint::Get { id } => segments(["accounts", id.as_str()]),
            AccountEndpoint::VerifyCredentials => segments(["accounts", "verify_credentials"]),
            AccountEndpoint::Lookup { .. } => segments(["accounts", "lookup"]),
        }
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn query_items(&self) -> Vec<(String, String)> {
        match self {
            AccountEndpoint::Lookup { acct } => vec![("acct".to_string(), acct.clone())],
            _ => Vec::new(),
        }
    }
}

/// Operations that return the updated relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationshipEndpoint {
    Follow { id: String },
    Unfollow { id: String },
    Block { id: String },
    Unblock { id: String },
    Mute { id: String },
    Unmute { id: String },
}

impl Endpoint for RelationshipEndpoint {
    type Output = Relationship;

    fn path_components(&self) -> Vec<String> {
        let (id, action) = match self {
            RelationshipEndpoint::Follow { id } => (id, "follow"),
            RelationshipEndpoint::Unfollow { id } => (id, "unfollow"),
            RelationshipEndpoint::Block { id } => (id, "block"),
            RelationshipEndpoint::Unblock { id } => (id, "unblock"),
            RelationshipEndpoint::Mute { id } => (id, "mute"),
            RelationshipEndpoint::Unmute { id } => (id, "unmute"),
        };
        segments(["accounts", id.as_str(), action])
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }
}

/// `GET /api/v1/accounts/relationships?id[]=...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipsEndpoint {
    pub ids: Vec<String>,
}

impl Endpoint for RelationshipsEndpoint {
    type Output = Vec<Relationship>;

    fn path_components(&self) -> Vec<String> {
        segments(["accounts", "relationships"])
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn query_items(&self) -> Vec<(String, String)> {
        array_query("id", &self.ids)
    }
}

/// Accounts you follow that also follow each of `ids`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamiliarFollowersEndpoint {
    pub ids: Vec<String>,
}

impl Endpoint for FamiliarFollowersEndpoint {
    type Output = Vec<FamiliarFollowers>;

    fn path_components(&self) -> Vec<String> {
        segments(["accounts", "familiar_followers"])
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn query_items(&self) -> Vec<(String, String)> {
        array_query("id", &self.ids)
    }

    fn requires(&self) -> Option<CapabilityRequirements> {
        Some(CapabilityRequirements::minimum_versions(reference_since(3, 5, 0)))
    }

    fn fallback(&self) -> Option<Vec<FamiliarFollowers>> {
        Some(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountsEndpoint {
    Followers { id: String },
    Following { id: String },
    RebloggedBy { id: String },
    FavouritedBy { id: String },
    Blocks,
    Mutes,
}

impl Endpoint for AccountsEndpoint {
    type Output = Vec<Account>;

    fn path_components(&self) -> Vec<String> {
        match self {
            AccountsEndpoint::Followers { id } => segments(["accounts", id.as_str(), "followers"]),
            AccountsEndpoint::Following { id } => segments(["accounts", id.as_str(), "following"]),
            AccountsEndpoint::RebloggedBy { id } => {
                segments(["statuses", id.as_str(), "reblogged_by"])
            }
            AccountsEndpoint::FavouritedBy { id } => {
                segments(["statuses", id.as_str(), "favourited_by"])
            }
            AccountsEndpoint::Blocks => segments(["blocks"]),
            AccountsEndpoint::Mutes => segments(["mutes"]),
        }
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }
}

impl PagedEndpoint for AccountsEndpoint {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::ApiCapabilities;
    use crate::endpoints::test_support::url_of;

    #[test]
    fn lookup_query() {
        assert_eq!(
            url_of(&AccountEndpoint::Lookup {
                acct: "alice@remote.example".into()
            }),
            "https://social.example/api/v1/accounts/lookup?acct=alice%40remote.example"
        );
    }

    #[test]
    fn relationship_ids_are_array_params() {
        let endpoint = RelationshipsEndpoint {
            ids: vec!["1".into(), "2".into()],
        };
        assert_eq!(
            url_of(&endpoint),
            "https://social.example/api/v1/accounts/relationships?id%5B%5D=1&id%5B%5D=2"
        );
    }

    #[test]
    fn follow_is_post() {
        let follow = RelationshipEndpoint::Follow { id: "7".into() };
        assert_eq!(follow.method(), HttpMethod::Post);
        assert_eq!(url_of(&follow), "https://social.example/api/v1/accounts/7/follow");
    }

    #[test]
    fn familiar_followers_gated_with_fallback() {
        let endpoint = FamiliarFollowersEndpoint { ids: vec!["1".into()] };
        assert!(endpoint.supported_by(&ApiCapabilities::from_parts("mastodon", "3.5.0")));
        assert!(!endpoint.supported_by(&ApiCapabilities::from_parts("akkoma", "3.10.0")));
        assert_eq!(endpoint.fallback(), Some(vec![]));
    }

    #[test]
    fn collection_paths() {
        assert_eq!(
            url_of(&AccountsEndpoint::FavouritedBy { id: "3".into() }),
            "https://social.example/api/v1/statuses/3/favourited_by"
        );
        assert_eq!(url_of(&AccountsEndpoint::Mutes), "https://social.example/api/v1/mutes");
    }
}
