//! Client configuration, populated from environment variables.

use std::time::Duration;

use fedicap::capabilities::UnknownCompatibilityMode;
use fedicap::CompatibilityMode;
use url::Url;

/// Runtime configuration for a client session.
///
/// Every field has a default, so only the instance is needed to make calls.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `FEDICAP_INSTANCE` | (absent) | Base URL of the server, e.g. `https://social.example` |
/// | `FEDICAP_TOKEN` | (absent) | Bearer token sent with every request |
/// | `FEDICAP_TIMEOUT_SECS` | `30` | Whole-request timeout |
/// | `FEDICAP_CONNECT_TIMEOUT_SECS` | `10` | TCP/TLS connect timeout |
/// | `FEDICAP_USER_AGENT` | `fedicap/<version>` | `User-Agent` header |
/// | `FEDICAP_COMPATIBILITY_MODE` | (absent) | `fallback_on_errors` or `fail_on_errors` |
/// | `FEDICAP_DB` | (absent = in-memory) | Path to the SQLite secret store |
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Raw instance URL, validated by [`instance_url`](Self::instance_url).
    pub instance_url: Option<String>,

    pub access_token: Option<String>,

    pub timeout: Duration,

    pub connect_timeout: Duration,

    pub user_agent: String,

    pub compatibility_mode: Option<CompatibilityMode>,

    /// Path to the SQLite secret store.
    /// `None` means an in-memory store (nothing survives the process).
    pub db_path: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            instance_url: None,
            access_token: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("fedicap/", env!("CARGO_PKG_VERSION")).to_string(),
            compatibility_mode: None,
            db_path: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error(transparent)]
    InvalidCompatibilityMode(#[from] UnknownCompatibilityMode),

    #[error("no instance configured (set FEDICAP_INSTANCE or pass --instance)")]
    MissingInstance,

    #[error("invalid instance URL {value:?}: {reason}")]
    InvalidUrl { value: String, reason: String },

    #[error("could not build HTTP client: {0}")]
    HttpClient(String),
}

impl ClientConfig {
    /// Populate config from environment variables, applying defaults where absent.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// As [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let seconds = |var: &'static str, default: Duration| match non_empty(var) {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidNumber { var, value }),
            None => Ok(default),
        };

        let compatibility_mode = non_empty("FEDICAP_COMPATIBILITY_MODE")
            .map(|raw| raw.trim().parse::<CompatibilityMode>())
            .transpose()?;

        Ok(Self {
            instance_url: non_empty("FEDICAP_INSTANCE"),
            access_token: non_empty("FEDICAP_TOKEN"),
            timeout: seconds("FEDICAP_TIMEOUT_SECS", defaults.timeout)?,
            connect_timeout: seconds("FEDICAP_CONNECT_TIMEOUT_SECS", defaults.connect_timeout)?,
            user_agent: non_empty("FEDICAP_USER_AGENT").unwrap_or(defaults.user_agent),
            compatibility_mode,
            db_path: non_empty("FEDICAP_DB"),
        })
    }

    /// The configured instance as a URL. A bare host gets `https://`.
    pub fn instance_url(&self) -> Result<Url, ConfigError> {
        let raw = self
            .instance_url
            .as_deref()
            .ok_or(ConfigError::MissingInstance)?;
        let candidate = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("https://{raw}")
        };
        Url::parse(&candidate).map_err(|e| ConfigError::InvalidUrl {
            value: raw.to_string(),
            reason: e.to_string(),
        })
    }

    /// A pooled HTTP client honoring the timeouts and user agent.
    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("fedicap/"));
    }

    #[test]
    fn reads_every_variable() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("FEDICAP_INSTANCE", "social.example"),
            ("FEDICAP_TOKEN", "tok"),
            ("FEDICAP_TIMEOUT_SECS", "5"),
            ("FEDICAP_CONNECT_TIMEOUT_SECS", "2"),
            ("FEDICAP_USER_AGENT", "probe/1"),
            ("FEDICAP_COMPATIBILITY_MODE", "fallback_on_errors"),
            ("FEDICAP_DB", "/tmp/fedicap.db"),
        ]))
        .unwrap();
        assert_eq!(config.access_token.as_deref(), Some("tok"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.user_agent, "probe/1");
        assert_eq!(
            config.compatibility_mode,
            Some(CompatibilityMode::FallbackOnErrors)
        );
        assert_eq!(config.db_path.as_deref(), Some("/tmp/fedicap.db"));
        assert_eq!(
            config.instance_url().unwrap().as_str(),
            "https://social.example/"
        );
    }

    #[test]
    fn bad_numbers_are_reported() {
        let error =
            ClientConfig::from_lookup(lookup(&[("FEDICAP_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(
            error,
            ConfigError::InvalidNumber {
                var: "FEDICAP_TIMEOUT_SECS",
                ..
            }
        ));
    }

    #[test]
    fn unknown_compatibility_mode_is_rejected() {
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("FEDICAP_COMPATIBILITY_MODE", "lenient")])),
            Err(ConfigError::InvalidCompatibilityMode(_))
        ));
    }

    #[test]
    fn missing_instance_is_an_error() {
        assert!(matches!(
            ClientConfig::default().instance_url(),
            Err(ConfigError::MissingInstance)
        ));
    }
}
