//! Media uploads.

use fedicap_api::Attachment;
use serde_json::json;

use super::segments;
use crate::endpoint::Endpoint;
use crate::target::{HttpMethod, MultipartField, RequestBody};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEndpoint {
    /// Multipart upload to `/api/v2/media`. The server may process the file
    /// asynchronously, in which case the returned attachment has no `url` yet.
    Upload {
        data: Vec<u8>,
        filename: String,
        mime_type: String,
        description: Option<String>,
    },
    /// Change the alt text of an uploaded, not yet attached, file.
    Update {
        id: String,
        description: String,
    },
}

impl Endpoint for MediaEndpoint {
    type Output = Attachment;

    fn context(&self) -> &'static [&'static str] {
        match self {
            MediaEndpoint::Upload { .. } => &["api", "v2"],
            MediaEndpoint::Update { .. } => crate::endpoint::DEFAULT_CONTEXT,
        }
    }

    fn path_components(&self) -> Vec<String> {
        match self {
            MediaEndpoint::Upload { .. } => segments(["media"]),
            MediaEndpoint::Update { id, .. } => segments(["media", id.as_str()]),
        }
    }

    fn method(&self) -> HttpMethod {
        match self {
            MediaEndpoint::Upload { .. } => HttpMethod::Post,
            MediaEndpoint::Update { .. } => HttpMethod::Put,
        }
    }

    fn body(&self) -> Option<RequestBody> {
        match self {
            MediaEndpoint::Upload {
                data,
                filename,
                mime_type,
                description,
            } => {
                let mut fields = vec![(
                    "file".to_string(),
                    MultipartField::File {
                        data: data.clone(),
                        filename: filename.clone(),
                        mime_type: mime_type.clone(),
                    },
                )];
                if let Some(description) = description {
                    fields.push((
                        "description".to_string(),
                        MultipartField::Text(description.clone()),
                    ));
                }
                Some(RequestBody::Multipart(fields))
            }
            MediaEndpoint::Update { description, .. } => {
                Some(RequestBody::Json(json!({ "description": description })))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::test_support::url_of;

    #[test]
    fn upload_is_multipart_on_v2() {
        let upload = MediaEndpoint::Upload {
            data: vec![1, 2, 3],
            filename: "a.png".into(),
            mime_type: "image/png".into(),
            description: Some("alt".into()),
        };
        assert_eq!(url_of(&upload), "https://social.example/api/v2/media");
        let Some(RequestBody::Multipart(fields)) = upload.body() else {
            panic!("expected multipart body");
        };
        let names: Vec<&str> = fields.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["file", "description"]);
    }

    #[test]
    fn update_stays_on_v1() {
        let update = MediaEndpoint::Update {
            id: "5".into(),
            description: "alt".into(),
        };
        assert_eq!(url_of(&update), "https://social.example/api/v1/media/5");
        assert_eq!(update.body(), Some(RequestBody::Json(json!({"description": "alt"}))));
    }
}
