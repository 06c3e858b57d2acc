//! Declarative per-endpoint capability requirements.
//!
//! Each endpoint that is not universally available declares the minimum
//! server version per [`Flavor`] it needs, and optionally a second path
//! through a runtime-detected [`Feature`]. The check is fail-closed: a server
//! whose flavor or version is unknown never satisfies a requirement.

use std::collections::{BTreeMap, BTreeSet};

use semver::{BuildMetadata, Version};
use serde::Serialize;

use crate::capabilities::{ApiCapabilities, Feature, Flavor};

/// Sentinel minimum for "available in every version we have seen".
pub const ASSUMED_AVAILABLE: Version = Version::new(0, 0, 0);

/// One way a requirement set can be satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequirementPath {
    /// The server's flavor appears in the table and its version is at least
    /// the listed minimum.
    MinimumVersion { minimums: BTreeMap<Flavor, Version> },

    /// The server's flavor is one of `flavors` and it advertises `feature`.
    Feature {
        flavors: BTreeSet<Flavor>,
        feature: Feature,
    },
}

impl RequirementPath {
    fn satisfied_by(&self, capabilities: &ApiCapabilities) -> bool {
        let (Some(flavor), Some(version)) = (capabilities.flavor, &capabilities.version) else {
            return false;
        };
        match self {
            RequirementPath::MinimumVersion { minimums } => minimums
                .get(&flavor)
                .is_some_and(|minimum| meets_minimum(version, minimum)),
            RequirementPath::Feature { flavors, feature } => {
                flavors.contains(&flavor) && capabilities.has_feature(*feature)
            }
        }
    }
}

/// A set of alternative [`RequirementPath`]s; satisfied if any one is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityRequirements {
    paths: Vec<RequirementPath>,
}

impl CapabilityRequirements {
    /// Minimum version per flavor. Flavors not listed are unsupported.
    pub fn minimum_versions(table: impl IntoIterator<Item = (Flavor, Version)>) -> Self {
        Self {
            paths: vec![RequirementPath::MinimumVersion {
                minimums: table.into_iter().collect(),
            }],
        }
    }

    /// Available on `flavors` whenever the server advertises `feature`.
    pub fn feature(feature: Feature, flavors: impl IntoIterator<Item = Flavor>) -> Self {
        Self {
            paths: vec![RequirementPath::Feature {
                flavors: flavors.into_iter().collect(),
                feature,
            }],
        }
    }

    /// Combine two requirement sets into one satisfied when either is.
    pub fn or(mut self, other: CapabilityRequirements) -> Self {
        self.paths.extend(other.paths);
        self
    }

    pub fn satisfied_by(&self, capabilities: &ApiCapabilities) -> bool {
        self.paths.iter().any(|path| path.satisfied_by(capabilities))
    }

    pub fn paths(&self) -> &[RequirementPath] {
        &self.paths
    }

    /// The lowest version of `flavor` any version path accepts, if listed.
    pub fn minimum_version(&self, flavor: Flavor) -> Option<&Version> {
        self.paths
            .iter()
            .filter_map(|path| match path {
                RequirementPath::MinimumVersion { minimums } => minimums.get(&flavor),
                RequirementPath::Feature { .. } => None,
            })
            .min()
    }
}

/// Build metadata carries no ordering meaning for us (`4.1.3+glitch` is a
/// 4.1.3); pre-release ordering is kept.
fn meets_minimum(version: &Version, minimum: &Version) -> bool {
    let mut comparable = version.clone();
    comparable.build = BuildMetadata::EMPTY;
    comparable >= *minimum
}
