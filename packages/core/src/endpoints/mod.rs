//! The endpoint catalog.
//!
//! Endpoints are grouped by API area. Within an area there is one type per
//! result type, since [`Endpoint::Output`](crate::Endpoint::Output) is fixed
//! per type; enum variants carry their own parameters.
//!
//! | Module | Endpoints |
//! |--------|-----------|
//! | [`instance`] | [`InstanceEndpoint`], [`InstanceV2Endpoint`], [`RulesEndpoint`], [`CustomEmojisEndpoint`] |
//! | [`statuses`] | [`StatusesEndpoint`] (paged) |
//! | [`status`] | [`StatusEndpoint`], [`TranslationEndpoint`] |
//! | [`accounts`] | [`AccountEndpoint`], [`RelationshipEndpoint`], [`RelationshipsEndpoint`], [`FamiliarFollowersEndpoint`], [`AccountsEndpoint`] (paged) |
//! | [`tags`] | [`TagEndpoint`], [`TagsEndpoint`] (paged) |
//! | [`notifications`] | [`NotificationsEndpoint`] (paged) |
//! | [`lists`] | [`ListsEndpoint`], [`ListEndpoint`], [`DeleteListEndpoint`] |
//! | [`announcements`] | [`AnnouncementsEndpoint`], [`DismissAnnouncementEndpoint`] |
//! | [`media`] | [`MediaEndpoint`] |
//! | [`reports`] | [`ReportEndpoint`] |

pub mod accounts;
pub mod announcements;
pub mod instance;
pub mod lists;
pub mod media;
pub mod notifications;
pub mod reports;
pub mod status;
pub mod statuses;
pub mod tags;

pub use accounts::{
    AccountEndpoint, AccountsEndpoint, FamiliarFollowersEndpoint, RelationshipEndpoint,
    RelationshipsEndpoint,
};
pub use announcements::{AnnouncementsEndpoint, DismissAnnouncementEndpoint};
pub use instance::{CustomEmojisEndpoint, InstanceEndpoint, InstanceV2Endpoint, RulesEndpoint};
pub use lists::{DeleteListEndpoint, ListEndpoint, ListsEndpoint};
pub use media::MediaEndpoint;
pub use notifications::NotificationsEndpoint;
pub use reports::ReportEndpoint;
pub use status::{NewStatus, StatusEndpoint, TranslationEndpoint};
pub use statuses::StatusesEndpoint;
pub use tags::{TagEndpoint, TagsEndpoint};

use semver::Version;

use crate::capabilities::Flavor;
use crate::requirements::{CapabilityRequirements, ASSUMED_AVAILABLE};

pub(crate) fn segments<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// The reference implementation and its version-tracking fork share
/// minimums.
pub(crate) fn reference_since(major: u64, minor: u64, patch: u64) -> [(Flavor, Version); 2] {
    [
        (Flavor::Mastodon, Version::new(major, minor, patch)),
        (Flavor::Hometown, Version::new(major, minor, patch)),
    ]
}

/// Bookmarks arrived in 3.1 upstream; every fork has them.
pub(crate) fn bookmarks() -> CapabilityRequirements {
    let mut table = reference_since(3, 1, 0).to_vec();
    table.extend(
        [Flavor::Pleroma, Flavor::Akkoma, Flavor::Gotosocial, Flavor::Firefish]
            .map(|f| (f, ASSUMED_AVAILABLE)),
    );
    CapabilityRequirements::minimum_versions(table)
}

/// `name[]=value` pairs for an array-valued query parameter.
pub(crate) fn array_query<'a>(
    name: &str,
    values: impl IntoIterator<Item = &'a String>,
) -> Vec<(String, String)> {
    values
        .into_iter()
        .map(|value| (format!("{name}[]"), value.clone()))
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use url::Url;

    use crate::endpoint::{target, Endpoint};

    /// The URL `endpoint` would hit on a fixed test instance.
    pub fn url_of<E: Endpoint>(endpoint: &E) -> String {
        let base = Url::parse("https://social.example").unwrap();
        target(endpoint, &base, None).url().to_string()
    }
}
