//! Instance metadata: `GET /api/v1/instance` and `GET /api/v2/instance`.
//!
//! The v1 document is the one every flavor serves. Pleroma-derived servers
//! extend it with a `pleroma.metadata.features` list, which is where the
//! capability layer detects optional features at runtime.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Instance {
    /// Domain name. Named `uri` for historical reasons.
    #[serde(default)]
    pub uri: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Version string as reported by the client API. Forks often embed a
    /// compatibility version here, e.g. `"2.7.2 (compatible; Pleroma 2.5.0)"`.
    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub max_toot_chars: Option<u32>,

    #[serde(default)]
    pub languages: Vec<String>,

    #[serde(default)]
    pub rules: Vec<Rule>,

    #[serde(default)]
    pub configuration: Option<serde_json::Value>,

    /// Present only on Pleroma-derived servers.
    #[serde(default)]
    pub pleroma: Option<PleromaExtension>,
}

impl Instance {
    /// The `pleroma.metadata.features` list, or empty.
    pub fn advertised_features(&self) -> &[String] {
        self.pleroma
            .as_ref()
            .map(|p| p.metadata.features.as_slice())
            .unwrap_or_default()
    }

    /// `configuration.translation.enabled`, when the server reports it.
    pub fn translation_enabled(&self) -> bool {
        self.configuration
            .as_ref()
            .and_then(|c| c.pointer("/translation/enabled"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PleromaExtension {
    #[serde(default)]
    pub metadata: PleromaMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PleromaMetadata {
    #[serde(default)]
    pub features: Vec<String>,
}

/// `GET /api/v2/instance`. Only the fields that differ in shape from v1.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstanceV2 {
    pub domain: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub source_url: Option<String>,

    #[serde(default)]
    pub configuration: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rule {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomEmoji {
    pub shortcode: String,
    pub url: String,

    #[serde(default)]
    pub static_url: Option<String>,

    #[serde(default = "default_true")]
    pub visible_in_picker: bool,

    #[serde(default)]
    pub category: Option<String>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pleroma_features_are_exposed() {
        let json = r#"{
            "uri": "fe.example",
            "version": "2.7.2 (compatible; Akkoma 3.10.4)",
            "pleroma": { "metadata": { "features": ["pleroma_emoji_reactions", "bubble_timeline"] } }
        }"#;
        let instance: Instance = serde_json::from_str(json).unwrap();
        assert_eq!(
            instance.advertised_features(),
            ["pleroma_emoji_reactions", "bubble_timeline"]
        );
    }

    #[test]
    fn reference_instance_has_no_features() {
        let instance: Instance =
            serde_json::from_str(r#"{"uri":"mastodon.example","version":"4.2.0"}"#).unwrap();
        assert!(instance.advertised_features().is_empty());
        assert!(!instance.translation_enabled());
    }

    #[test]
    fn translation_flag_read_from_configuration() {
        let instance: Instance = serde_json::from_str(
            r#"{"uri":"m.example","configuration":{"translation":{"enabled":true}}}"#,
        )
        .unwrap();
        assert!(instance.translation_enabled());
    }
}
