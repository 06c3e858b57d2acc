//! Abstract request description and its wire encoding.
//!
//! A [`Target`] is pure data: the transport turns it into an HTTP request,
//! tests and interceptors inspect it. Nothing mutates a target after it is
//! built.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Safe methods have no server-side effect; failures on them are
    /// candidates for quiet handling.
    pub fn is_safe(&self) -> bool {
        matches!(self, HttpMethod::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartField {
    Text(String),
    File {
        data: Vec<u8>,
        filename: String,
        mime_type: String,
    },
}

/// A request body. JSON and multipart are mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(serde_json::Value),
    Multipart(Vec<(String, MultipartField)>),
}

/// A body ready to put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl RequestBody {
    /// Encode the body. Multipart bodies get a fresh `Boundary-<uuid>`.
    pub fn encode(&self) -> EncodedBody {
        match self {
            RequestBody::Json(value) => EncodedBody {
                content_type: JSON_CONTENT_TYPE.to_string(),
                bytes: value.to_string().into_bytes(),
            },
            RequestBody::Multipart(fields) => {
                let boundary = multipart_boundary();
                EncodedBody {
                    content_type: format!("multipart/form-data; boundary={boundary}"),
                    bytes: encode_multipart(fields, &boundary),
                }
            }
        }
    }
}

pub fn multipart_boundary() -> String {
    format!("Boundary-{}", Uuid::new_v4())
}

/// Encode multipart form data with the given boundary.
///
/// Every part carries a `Content-Type`; text parts are sent as UTF-8 plain
/// text. Field names and filenames are quoted with `"`, CR and LF
/// percent-encoded, as browsers do for `multipart/form-data`.
pub fn encode_multipart(fields: &[(String, MultipartField)], boundary: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for (name, field) in fields {
        let name = quote_disposition_param(name);
        out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        match field {
            MultipartField::Text(text) => {
                out.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"\r\n\
                         Content-Type: text/plain; charset=utf-8\r\n\r\n"
                    )
                    .as_bytes(),
                );
                out.extend_from_slice(text.as_bytes());
            }
            MultipartField::File {
                data,
                filename,
                mime_type,
            } => {
                let filename = quote_disposition_param(filename);
                out.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: {mime_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                out.extend_from_slice(data);
            }
        }
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    out
}

fn quote_disposition_param(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Everything needed to issue one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub base_url: Url,
    pub path_components: Vec<String>,
    pub method: HttpMethod,
    /// Query pairs in order. Repeated names (`id[]=1&id[]=2`) are allowed.
    pub query: Vec<(String, String)>,
    /// Pairs already in wire form, written after `query` without encoding.
    pub encoded_query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub headers: BTreeMap<String, String>,
}

impl Target {
    pub fn new(base_url: Url, method: HttpMethod, path_components: Vec<String>) -> Self {
        Self {
            base_url,
            path_components,
            method,
            query: Vec::new(),
            encoded_query: Vec::new(),
            body: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn with_query(mut self, query: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(query);
        self
    }

    /// Append pairs whose values are already percent-encoded, such as
    /// cursor tokens lifted from a `Link` header. Only `&` is escaped.
    pub fn with_encoded_query(
        mut self,
        query: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.encoded_query.extend(query);
        self
    }

    pub fn with_body(mut self, body: Option<RequestBody>) -> Self {
        self.body = body;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// The full request URL.
    ///
    /// Path components are appended to the base URL's path, each encoded as a
    /// single segment, so a component containing `/` or `:` cannot change the
    /// route. Query pairs keep their order; encoded pairs follow them
    /// byte for byte.
    pub fn url(&self) -> Url {
        let mut url = self.base_url.clone();
        if !self.path_components.is_empty() {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments
                    .pop_if_empty()
                    .extend(self.path_components.iter().map(String::as_str));
            }
        }
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }
        if !self.encoded_query.is_empty() {
            let mut query = url.query().unwrap_or_default().to_string();
            for (name, value) in &self.encoded_query {
                if !query.is_empty() {
                    query.push('&');
                }
                query.push_str(name);
                query.push('=');
                query.push_str(&value.replace('&', "%26"));
            }
            url.set_query(Some(&query));
        }
        url
    }

    /// Value of a query parameter, first occurrence. Encoded pairs are
    /// returned in wire form.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .chain(&self.encoded_query)
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://social.example").unwrap()
    }

    #[test]
    fn url_joins_components_and_query() {
        let target = Target::new(
            base(),
            HttpMethod::Get,
            vec!["api".into(), "v1".into(), "timelines".into(), "public".into()],
        )
        .with_query([("local".into(), "true".into()), ("max_id".into(), "7".into())]);
        assert_eq!(
            target.url().as_str(),
            "https://social.example/api/v1/timelines/public?local=true&max_id=7"
        );
    }

    #[test]
    fn components_are_single_segments() {
        let target = Target::new(
            base(),
            HttpMethod::Get,
            vec!["api".into(), "v1".into(), "tags".into(), "a/b".into()],
        );
        assert_eq!(target.url().as_str(), "https://social.example/api/v1/tags/a%2Fb");
    }

    #[test]
    fn base_path_is_preserved() {
        let base = Url::parse("https://example.com/fedi/").unwrap();
        let target = Target::new(base, HttpMethod::Get, vec!["api".into()]);
        assert_eq!(target.url().as_str(), "https://example.com/fedi/api");
    }

    #[test]
    fn absolute_target_url_is_untouched() {
        let base = Url::parse("https://s.example/nodeinfo/2.0/?x=1").unwrap();
        let target = Target::new(base.clone(), HttpMethod::Get, vec![]);
        assert_eq!(target.url(), base);
    }

    #[test]
    fn encoded_pairs_are_not_reencoded() {
        let target = Target::new(base(), HttpMethod::Get, vec!["api".into()])
            .with_query([("limit".into(), "20".into())])
            .with_encoded_query([
                ("max_id".into(), "a~b".into()),
                ("min_id".into(), "2024-01-01T00:00:00Z".into()),
                ("since_id".into(), "AbC%2B109".into()),
            ]);
        assert_eq!(
            target.url().query(),
            Some("limit=20&max_id=a~b&min_id=2024-01-01T00:00:00Z&since_id=AbC%2B109")
        );
        assert_eq!(target.query_value("since_id"), Some("AbC%2B109"));
    }

    #[test]
    fn encoded_pairs_cannot_split_the_query() {
        let target = Target::new(base(), HttpMethod::Get, vec![])
            .with_encoded_query([("max_id".into(), "1&limit=999".into())]);
        assert_eq!(target.url().query(), Some("max_id=1%26limit=999"));
    }

    #[test]
    fn only_get_is_safe() {
        assert!(HttpMethod::Get.is_safe());
        for m in [HttpMethod::Post, HttpMethod::Put, HttpMethod::Patch, HttpMethod::Delete] {
            assert!(!m.is_safe());
        }
    }

    #[test]
    fn multipart_layout() {
        let fields = vec![
            (
                "file".to_string(),
                MultipartField::File {
                    data: b"PNGDATA".to_vec(),
                    filename: "cat.png".into(),
                    mime_type: "image/png".into(),
                },
            ),
            ("description".to_string(), MultipartField::Text("a cat".into())),
        ];
        let encoded = String::from_utf8(encode_multipart(&fields, "Boundary-X")).unwrap();
        assert_eq!(
            encoded,
            "--Boundary-X\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"cat.png\"\r\n\
             Content-Type: image/png\r\n\r\n\
             PNGDATA\r\n\
             --Boundary-X\r\n\
             Content-Disposition: form-data; name=\"description\"\r\n\
             Content-Type: text/plain; charset=utf-8\r\n\r\n\
             a cat\r\n\
             --Boundary-X--\r\n"
        );
    }

    #[test]
    fn disposition_params_cannot_inject_headers() {
        let fields = vec![(
            "file\r\nX-Injected: 1".to_string(),
            MultipartField::File {
                data: b"x".to_vec(),
                filename: "a\".png\r\nContent-Type: text/html".into(),
                mime_type: "image/png".into(),
            },
        )];
        let encoded = String::from_utf8(encode_multipart(&fields, "B")).unwrap();
        let headers = encoded.split("\r\n\r\n").next().unwrap();
        assert_eq!(
            headers,
            "--B\r\n\
             Content-Disposition: form-data; name=\"file%0D%0AX-Injected: 1\"; \
             filename=\"a%22.png%0D%0AContent-Type: text/html\"\r\n\
             Content-Type: image/png"
        );
    }

    #[test]
    fn encoded_bodies_carry_content_type() {
        let json = RequestBody::Json(serde_json::json!({"status": "hi"})).encode();
        assert_eq!(json.content_type, JSON_CONTENT_TYPE);
        assert_eq!(json.bytes, br#"{"status":"hi"}"#);

        let multipart = RequestBody::Multipart(vec![]).encode();
        let boundary = multipart
            .content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap();
        assert!(boundary.starts_with("Boundary-"));
        assert_eq!(multipart.bytes, format!("--{boundary}--\r\n").into_bytes());
    }
}
