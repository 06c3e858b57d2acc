//! User-defined lists.

use fedicap_api::{Empty, List};
use serde_json::json;

use super::segments;
use crate::endpoint::Endpoint;
use crate::target::{HttpMethod, RequestBody};

/// `GET /api/v1/lists`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListsEndpoint;

impl Endpoint for ListsEndpoint {
    type Output = Vec<List>;

    fn path_components(&self) -> Vec<String> {
        segments(["lists"])
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn fallback(&self) -> Option<Vec<List>> {
        Some(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEndpoint {
    Get { id: String },
    Create { title: String },
    Rename { id: String, title: String },
}

impl Endpoint for ListEndpoint {
    type Output = List;

    fn path_components(&self) -> Vec<String> {
        match self {
            ListEndpoint::Create { .. } => segments(["lists"]),
            ListEndpoint::Get { id } | ListEndpoint::Rename { id, .. } => {
                segments(["lists", id.as_str()])
            }
        }
    }

    fn method(&self) -> HttpMethod {
        match self {
            ListEndpoint::Get { .. } => HttpMethod::Get,
            ListEndpoint::Create { .. } => HttpMethod::Post,
            ListEndpoint::Rename { .. } => HttpMethod::Put,
        }
    }

    fn body(&self) -> Option<RequestBody> {
        match self {
            ListEndpoint::Get { .. } => None,
            ListEndpoint::Create { title } | ListEndpoint::Rename { title, .. } => {
                Some(RequestBody::Json(json!({ "title": title })))
            }
        }
    }
}

/// `DELETE /api/v1/lists/:id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteListEndpoint {
    pub id: String,
}

impl Endpoint for DeleteListEndpoint {
    type Output = Empty;

    fn path_components(&self) -> Vec<String> {
        segments(["lists", self.id.as_str()])
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Delete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::test_support::url_of;

    #[test]
    fn create_and_rename_send_title() {
        let create = ListEndpoint::Create {
            title: "friends".into(),
        };
        assert_eq!(create.method(), HttpMethod::Post);
        assert_eq!(create.body(), Some(RequestBody::Json(json!({"title": "friends"}))));

        let rename = ListEndpoint::Rename {
            id: "4".into(),
            title: "pals".into(),
        };
        assert_eq!(url_of(&rename), "https://social.example/api/v1/lists/4");
    }

    #[test]
    fn delete_returns_empty() {
        let delete = DeleteListEndpoint { id: "4".into() };
        assert_eq!(delete.method(), HttpMethod::Delete);
        assert!(delete.fallback().is_none());
    }
}
