//! Notifications.

use fedicap_api::{Notification, NotificationType};

use super::segments;
use crate::endpoint::{Endpoint, PagedEndpoint};
use crate::target::HttpMethod;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationsEndpoint {
    /// All notifications, optionally filtered. Empty filters are omitted.
    Notifications {
        types: Vec<NotificationType>,
        exclude_types: Vec<NotificationType>,
    },
    Mentions,
}

impl Endpoint for NotificationsEndpoint {
    type Output = Vec<Notification>;

    fn path_components(&self) -> Vec<String> {
        segments(["notifications"])
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn query_items(&self) -> Vec<(String, String)> {
        fn filter(name: &str, types: &[NotificationType]) -> Vec<(String, String)> {
            types
                .iter()
                .map(|t| (format!("{name}[]"), t.as_str().to_string()))
                .collect()
        }

        match self {
            NotificationsEndpoint::Notifications {
                types,
                exclude_types,
            } => {
                let mut items = filter("types", types);
                items.extend(filter("exclude_types", exclude_types));
                items
            }
            NotificationsEndpoint::Mentions => filter("types", &[NotificationType::Mention]),
        }
    }
}

impl PagedEndpoint for NotificationsEndpoint {}
