//! Instance announcements.

use fedicap_api::{Announcement, Empty};
use semver::Version;

use super::{reference_since, segments};
use crate::capabilities::Flavor;
use crate::endpoint::Endpoint;
use crate::requirements::{CapabilityRequirements, ASSUMED_AVAILABLE};
use crate::target::HttpMethod;

fn announcements() -> CapabilityRequirements {
    let mut table = reference_since(3, 1, 0).to_vec();
    table.push((Flavor::Pleroma, Version::new(2, 2, 0)));
    table.push((Flavor::Akkoma, ASSUMED_AVAILABLE));
    CapabilityRequirements::minimum_versions(table)
}

/// `GET /api/v1/announcements`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnouncementsEndpoint;

impl Endpoint for AnnouncementsEndpoint {
    type Output = Vec<Announcement>;

    fn path_components(&self) -> Vec<String> {
        segments(["announcements"])
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn requires(&self) -> Option<CapabilityRequirements> {
        Some(announcements())
    }

    fn fallback(&self) -> Option<Vec<Announcement>> {
        Some(Vec::new())
    }
}

/// `POST /api/v1/announcements/:id/dismiss`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DismissAnnouncementEndpoint {
    pub id: String,
}

impl Endpoint for DismissAnnouncementEndpoint {
    type Output = Empty;

    fn path_components(&self) -> Vec<String> {
        segments(["announcements", self.id.as_str(), "dismiss"])
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn requires(&self) -> Option<CapabilityRequirements> {
        Some(announcements())
    }
}
