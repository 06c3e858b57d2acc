//! Hashtags: lookup, following, trends.

use fedicap_api::Tag;

use super::{reference_since, segments};
use crate::capabilities::Flavor;
use crate::endpoint::{Endpoint, PagedEndpoint};
use crate::requirements::{CapabilityRequirements, ASSUMED_AVAILABLE};
use crate::target::HttpMethod;

fn followed_tags() -> CapabilityRequirements {
    let mut table = reference_since(4, 0, 0).to_vec();
    table.push((Flavor::Akkoma, ASSUMED_AVAILABLE));
    CapabilityRequirements::minimum_versions(table)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagEndpoint {
    Get { name: String },
    Follow { name: String },
    Unfollow { name: String },
}

impl Endpoint for TagEndpoint {
    type Output = Tag;

    fn path_components(&self) -> Vec<String> {
        match self {
            TagEndpoint::Get { name } => segments(["tags", name.as_str()]),
            TagEndpoint::Follow { name } => segments(["tags", name.as_str(), "follow"]),
            TagEndpoint::Unfollow { name } => segments(["tags", name.as_str(), "unfollow"]),
        }
    }

    fn method(&self) -> HttpMethod {
        match self {
            TagEndpoint::Get { .. } => HttpMethod::Get,
            TagEndpoint::Follow { .. } | TagEndpoint::Unfollow { .. } => HttpMethod::Post,
        }
    }

    fn requires(&self) -> Option<CapabilityRequirements> {
        Some(followed_tags())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagsEndpoint {
    Followed,
    Trending,
}

impl Endpoint for TagsEndpoint {
    type Output = Vec<Tag>;

    fn path_components(&self) -> Vec<String> {
        match self {
            TagsEndpoint::Followed => segments(["followed_tags"]),
            TagsEndpoint::Trending => segments(["trends", "tags"]),
        }
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn requires(&self) -> Option<CapabilityRequirements> {
        match self {
            TagsEndpoint::Followed => Some(followed_tags()),
            TagsEndpoint::Trending => Some(CapabilityRequirements::minimum_versions(
                reference_since(3, 5, 0),
            )),
        }
    }

    fn fallback(&self) -> Option<Vec<Tag>> {
        Some(Vec::new())
    }
}

impl PagedEndpoint for TagsEndpoint {}
