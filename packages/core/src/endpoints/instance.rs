//! Instance metadata endpoints.

use fedicap_api::{CustomEmoji, Instance, InstanceV2, Rule};

use super::{reference_since, segments};
use crate::capabilities::Flavor;
use crate::endpoint::Endpoint;
use crate::requirements::{CapabilityRequirements, ASSUMED_AVAILABLE};
use crate::target::HttpMethod;

/// `GET /api/v1/instance`. Served by every flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceEndpoint;

impl Endpoint for InstanceEndpoint {
    type Output = Instance;

    fn path_components(&self) -> Vec<String> {
        segments(["instance"])
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }
}

/// `GET /api/v2/instance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceV2Endpoint;

impl Endpoint for InstanceV2Endpoint {
    type Output = InstanceV2;

    fn context(&self) -> &'static [&'static str] {
        &["api", "v2"]
    }

    fn path_components(&self) -> Vec<String> {
        segments(["instance"])
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn requires(&self) -> Option<CapabilityRequirements> {
        let mut table = reference_since(4, 0, 0).to_vec();
        table.push((Flavor::Gotosocial, semver::Version::new(0, 14, 0)));
        Some(CapabilityRequirements::minimum_versions(table))
    }
}

/// `GET /api/v1/instance/rules`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RulesEndpoint;

impl Endpoint for RulesEndpoint {
    type Output = Vec<Rule>;

    fn path_components(&self) -> Vec<String> {
        segments(["instance", "rules"])
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn requires(&self) -> Option<CapabilityRequirements> {
        let mut table = reference_since(3, 4, 0).to_vec();
        table.extend(
            [Flavor::Pleroma, Flavor::Akkoma, Flavor::Gotosocial].map(|f| (f, ASSUMED_AVAILABLE)),
        );
        Some(CapabilityRequirements::minimum_versions(table))
    }

    fn fallback(&self) -> Option<Vec<Rule>> {
        Some(Vec::new())
    }
}

/// `GET /api/v1/custom_emojis`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomEmojisEndpoint;

impl Endpoint for CustomEmojisEndpoint {
    type Output = Vec<CustomEmoji>;

    fn path_components(&self) -> Vec<String> {
        segments(["custom_emojis"])
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn fallback(&self) -> Option<Vec<CustomEmoji>> {
        Some(Vec::new())
    }
}
