//! Moderation reports.

use fedicap_api::Report;
use serde_json::json;

use super::segments;
use crate::endpoint::Endpoint;
use crate::target::{HttpMethod, RequestBody};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEndpoint {
    /// `forward` asks the local server to pass the report on to the remote
    /// account's server.
    Create {
        account_id: String,
        status_ids: Vec<String>,
        comment: String,
        forward: bool,
    },
}

impl Endpoint for ReportEndpoint {
    type Output = Report;

    fn path_components(&self) -> Vec<String> {
        segments(["reports"])
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn body(&self) -> Option<RequestBody> {
        let ReportEndpoint::Create {
            account_id,
            status_ids,
            comment,
            forward,
        } = self;
        Some(RequestBody::Json(json!({
            "account_id": account_id,
            "status_ids": status_ids,
            "comment": comment,
            "forward": forward,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_body() {
        let report = ReportEndpoint::Create {
            account_id: "1".into(),
            status_ids: vec!["2".into(), "3".into()],
            comment: "spam".into(),
            forward: true,
        };
        assert_eq!(
            report.body(),
            Some(RequestBody::Json(json!({
                "account_id": "1",
                "status_ids": ["2", "3"],
                "comment": "spam",
                "forward": true,
            })))
        );
        assert!(report.requires().is_none());
    }
}
