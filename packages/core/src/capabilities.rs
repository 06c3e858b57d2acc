//! What we believe about a specific server.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use fedicap_api::{Instance, Software};
use semver::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::version::parse_version;

/// Server software families this client distinguishes between.
///
/// The serialized form is the exact software name servers report in their
/// NodeInfo document; matching is case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    /// The reference implementation.
    Mastodon,
    /// A fork of the reference implementation that tracks its versions.
    Hometown,
    Pleroma,
    /// A Pleroma fork.
    Akkoma,
    /// A minimal implementation with a subset of the API.
    Gotosocial,
    /// An alternate implementation exposing a compatibility API.
    Firefish,
}

impl Flavor {
    pub const ALL: [Flavor; 6] = [
        Flavor::Mastodon,
        Flavor::Hometown,
        Flavor::Pleroma,
        Flavor::Akkoma,
        Flavor::Gotosocial,
        Flavor::Firefish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Flavor::Mastodon => "mastodon",
            Flavor::Hometown => "hometown",
            Flavor::Pleroma => "pleroma",
            Flavor::Akkoma => "akkoma",
            Flavor::Gotosocial => "gotosocial",
            Flavor::Firefish => "firefish",
        }
    }

    /// Match a NodeInfo software name. Unknown names are `None`, not an error.
    pub fn from_software_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator override for how failures on fallback-capable endpoints are
/// handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatibilityMode {
    /// Swallow any failure and substitute the endpoint's fallback value.
    FallbackOnErrors,
    /// Surface failures normally.
    FailOnErrors,
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown compatibility mode {0:?} (expected fallback_on_errors or fail_on_errors)")]
pub struct UnknownCompatibilityMode(pub String);

impl FromStr for CompatibilityMode {
    type Err = UnknownCompatibilityMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fallback_on_errors" | "fallback" => Ok(CompatibilityMode::FallbackOnErrors),
            "fail_on_errors" | "fail" => Ok(CompatibilityMode::FailOnErrors),
            other => Err(UnknownCompatibilityMode(other.to_string())),
        }
    }
}

/// Optional features detected at runtime rather than implied by a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    EmojiReactions,
    BubbleTimeline,
    Translation,
}

impl Feature {
    /// Map an entry of the instance document's advertised feature list.
    pub fn from_advertised(name: &str) -> Option<Self> {
        match name {
            "pleroma_emoji_reactions" | "custom_emoji_reactions" => Some(Feature::EmojiReactions),
            "bubble_timeline" => Some(Feature::BubbleTimeline),
            "akkoma:machine_translation" => Some(Feature::Translation),
            _ => None,
        }
    }
}

/// Everything the client currently believes about one server.
///
/// A value type: refreshing capabilities builds a new instance that replaces
/// the old one, nothing is mutated in place. Serializable so a secret store
/// can persist it opaquely between sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCapabilities {
    pub flavor: Option<Flavor>,

    pub version: Option<Version>,

    #[serde(default)]
    pub compatibility_mode: Option<CompatibilityMode>,

    #[serde(default)]
    pub features: BTreeSet<Feature>,
}

impl ApiCapabilities {
    /// Derive capabilities from the NodeInfo `software` block.
    pub fn from_software(software: &Software) -> Self {
        Self::from_parts(&software.name, &software.version)
    }

    /// Derive capabilities from a software name and raw version string.
    pub fn from_parts(name: &str, version: &str) -> Self {
        Self {
            flavor: Flavor::from_software_name(name),
            version: parse_version(version),
            compatibility_mode: None,
            features: BTreeSet::new(),
        }
    }

    pub fn with_compatibility_mode(self, compatibility_mode: Option<CompatibilityMode>) -> Self {
        Self {
            compatibility_mode,
            ..self
        }
    }

    pub fn with_features(self, features: impl IntoIterator<Item = Feature>) -> Self {
        Self {
            features: features.into_iter().collect(),
            ..self
        }
    }

    /// Features an instance document advertises.
    ///
    /// Unknown feature names are ignored.
    pub fn detect_features(instance: &Instance) -> BTreeSet<Feature> {
        let mut features: BTreeSet<Feature> = instance
            .advertised_features()
            .iter()
            .filter_map(|name| Feature::from_advertised(name))
            .collect();
        if instance.translation_enabled() {
            features.insert(Feature::Translation);
        }
        features
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    pub fn falls_back_on_errors(&self) -> bool {
        self.compatibility_mode == Some(CompatibilityMode::FallbackOnErrors)
    }
}

impl fmt::Display for ApiCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.flavor {
            Some(flavor) => write!(f, "{flavor}")?,
            None => f.write_str("unknown software")?,
        }
        match &self.version {
            Some(version) => write!(f, " {version}"),
            None => f.write_str(" (unknown version)"),
        }
    }
}
