//! Server version parsing.
//!
//! Servers report free-form version strings. The reference server mostly
//! emits valid semver, but forks append build tags after a space
//! (`"0.15.0 git-6f7c9b3"`) or stack several `+` build suffixes
//! (`"4.1.3+glitch+cutiecity"`), which no semver parser accepts. Parsing is
//! therefore two-stage: strict semver first, then a relaxed pass that keeps
//! `major.minor.patch` and drops whatever follows.

use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

/// Parse a version string as reported in a discovery document.
///
/// Only the text before the first space is considered. Returns `None` when
/// neither the strict nor the relaxed parse recovers a version; a made-up
/// `0.0.0` is never returned.
pub fn parse_version(raw: &str) -> Option<Version> {
    let leading = raw.trim().split(' ').next().unwrap_or_default();
    if leading.is_empty() {
        return None;
    }
    Version::parse(leading)
        .ok()
        .or_else(|| parse_relaxed(leading))
}

/// Recover `major.minor[.patch]` from the start of `s`.
///
/// Pre-release and build metadata are discarded, not repaired: a string like
/// `4.1.3+glitch+cutiecity` yields plain `4.1.3`. An optional leading `v` is
/// accepted and a missing patch component reads as `0`.
pub fn parse_relaxed(s: &str) -> Option<Version> {
    let caps = RELAXED_RE.captures(s)?;
    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    let patch = match caps.get(3) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    Some(Version::new(major, minor, patch))
}

/// `^v?MAJOR.MINOR[.PATCH]`, anchored at the start only.
static RELAXED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?(\d+)\.(\d+)(?:\.(\d+))?").expect("invalid relaxed version regex")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_parse_keeps_build_metadata() {
        let v = parse_version("4.1.3+glitch").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (4, 1, 3));
        assert_eq!(v.build.as_str(), "glitch");
        assert!(v.pre.is_empty());
    }

    #[test]
    fn stacked_build_metadata_falls_back_to_relaxed() {
        assert!(Version::parse("4.1.3+glitch+cutiecity").is_err());
        let v = parse_version("4.1.3+glitch+cutiecity").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (4, 1, 3));
        assert!(v.pre.is_empty());
        assert!(v.build.is_empty());
    }

    #[test]
    fn pre_release_survives_strict_parse() {
        let v = parse_version("4.3.0-beta.1").unwrap();
        assert_eq!(v.pre.as_str(), "beta.1");
    }

    #[test]
    fn suffix_after_space_is_ignored() {
        let v = parse_version("0.15.0 git-6f7c9b3").unwrap();
        assert_eq!(v, Version::new(0, 15, 0));
    }

    /// Strings observed from real servers, and what we recover from them.
    #[test]
    fn observed_malformed_versions() {
        let table = [
            ("2.5.0-5-g1a2b3c-develop", Some(Version::parse("2.5.0-5-g1a2b3c-develop").unwrap())),
            ("3.4.1+glitch+hometown", Some(Version::new(3, 4, 1))),
            ("v1.4.3", Some(Version::new(1, 4, 3))),
            ("2024.2", Some(Version::new(2024, 2, 0))),
            ("1.0.0-rc.1+build.1+again", Some(Version::new(1, 0, 0))),
            ("4.2.0_custom", Some(Version::new(4, 2, 0))),
        ];
        for (raw, expected) in table {
            assert_eq!(parse_version(raw), expected, "parsing {raw:?}");
        }
    }

    #[test]
    fn unparseable_yields_none() {
        for raw in ["", "   ", "latest", "develop 4.0.0", "4", ".1.2"] {
            assert_eq!(parse_version(raw), None, "parsing {raw:?}");
        }
    }
}
