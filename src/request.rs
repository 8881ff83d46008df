use std::collections::BTreeMap;

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE},
    Method,
};
use serde::Deserialize;

use crate::{Result, UploadConfig, UploadError};

/// Request descriptor for an upload.
///
/// Mirrors the loose option objects upload callers usually pass around:
/// `uri` (or `url`), `method`, `headers`, `json` and `formData`. Anything left
/// unset is filled in when the upload starts:
/// - `method` defaults to `GET`
/// - `json` defaults to `true` (parse the response body as JSON)
/// - `headers` default to [`UploadConfig::default_headers`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub uri: Option<String>,
    pub url: Option<String>,
    pub method: Option<String>,
    pub json: Option<bool>,
    pub headers: Option<BTreeMap<String, String>>,
    /// Text fields sent next to the file part.
    #[serde(default)]
    pub form_data: BTreeMap<String, String>,
}

impl UploadRequest {
    /// Creates a descriptor targeting `uri`.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            ..Self::default()
        }
    }

    /// Builds a descriptor from an untyped JSON value.
    ///
    /// Fails with [`UploadError::InvalidRequest`] when `value` is not an
    /// object or its fields have the wrong shape.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        if !value.is_object() {
            return Err(UploadError::InvalidRequest(format!(
                "invalid params passed for request: {value}"
            )));
        }
        serde_json::from_value(value)
            .map_err(|err| UploadError::InvalidRequest(format!("malformed request: {err}")))
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Adds a header. The first call replaces the configured defaults.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn json(mut self, json: bool) -> Self {
        self.json = Some(json);
        self
    }

    pub fn form_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form_data.insert(name.into(), value.into());
        self
    }

    /// Target URI, preferring `uri` over `url`.
    pub fn target(&self) -> Option<&str> {
        let present = |target: &&str| !target.trim().is_empty();
        self.uri
            .as_deref()
            .filter(present)
            .or_else(|| self.url.as_deref().filter(present))
    }

    pub(crate) fn prepare(&self, config: &UploadConfig) -> Result<PreparedRequest> {
        let target = self
            .target()
            .ok_or_else(|| UploadError::InvalidRequest("missing uri in request".to_owned()))?
            .to_owned();

        let method = match self.method.as_deref() {
            Some(method) => Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
                .map_err(|_| {
                    UploadError::InvalidRequest(format!("invalid method '{method}' for {target}"))
                })?,
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!("{} had no method, setting it as 'GET'", target);
                Method::GET
            }
        };

        let mut headers = match &self.headers {
            Some(headers) => build_header_map(headers)?,
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!("{} had no headers, using configured defaults", target);
                build_header_map(config.default_headers())?
            }
        };
        // The multipart body sets its own content type and boundary.
        headers.remove(CONTENT_TYPE);

        let json = self.json.unwrap_or(true);
        if json && !headers.contains_key(ACCEPT) {
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        }

        Ok(PreparedRequest {
            target,
            method,
            json,
            headers,
            form_data: self
                .form_data
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        })
    }
}

/// Descriptor with every default resolved and headers validated.
#[derive(Clone, Debug)]
pub(crate) struct PreparedRequest {
    pub target: String,
    pub method: Method,
    pub json: bool,
    pub headers: HeaderMap,
    pub form_data: Vec<(String, String)>,
}

fn build_header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| UploadError::InvalidRequest(format!("invalid header name '{name}'")))?;
        let header_value = HeaderValue::from_str(value).map_err(|_| {
            UploadError::InvalidRequest(format!("invalid value for header '{name}'"))
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::json;

    use crate::{UploadConfig, UploadError, UploadRequest};

    fn config() -> UploadConfig {
        UploadConfig::with_headers([("api_key", "blt123"), ("authtoken", "secret")])
    }

    #[test]
    fn non_object_value_is_invalid() {
        for value in [json!("https://x"), json!(42), json!(null), json!([1])] {
            let err = UploadRequest::from_value(value).expect_err("must reject");
            assert!(matches!(err, UploadError::InvalidRequest(_)));
        }
    }

    #[test]
    fn missing_uri_and_url_is_invalid() {
        let request = UploadRequest::from_value(json!({"method": "POST"})).expect("object parses");
        let err = request.prepare(&config()).expect_err("must reject");
        match err {
            UploadError::InvalidRequest(message) => assert!(message.contains("missing uri")),
            other => panic!("expected invalid request, got {other:?}"),
        }
    }

    #[test]
    fn url_is_accepted_when_uri_is_absent() {
        let request =
            UploadRequest::from_value(json!({"url": "https://api.example.com/v3/assets"}))
                .expect("object parses");
        let prepared = request.prepare(&config()).expect("must prepare");
        assert_eq!(prepared.target, "https://api.example.com/v3/assets");
    }

    #[test]
    fn uri_wins_over_url() {
        let request = UploadRequest {
            uri: Some("https://a/".to_owned()),
            url: Some("https://b/".to_owned()),
            ..UploadRequest::default()
        };
        assert_eq!(request.target(), Some("https://a/"));
    }

    #[test]
    fn defaults_are_filled_in() {
        let prepared = UploadRequest::new("https://api.example.com/v3/assets")
            .prepare(&config())
            .expect("must prepare");
        assert_eq!(prepared.method, Method::GET);
        assert!(prepared.json);
        assert_eq!(prepared.headers.len(), 3);
        assert_eq!(prepared.headers["authtoken"], "secret");
        assert_eq!(prepared.headers["accept"], "application/json");
    }

    #[test]
    fn explicit_headers_replace_defaults() {
        let prepared = UploadRequest::new("https://api.example.com/v3/assets")
            .header("x-only", "1")
            .prepare(&config())
            .expect("must prepare");
        assert_eq!(prepared.headers.len(), 2);
        assert_eq!(prepared.headers["x-only"], "1");
        assert!(prepared.headers.get("api_key").is_none());
    }

    #[test]
    fn json_requests_accept_json_unless_caller_overrides() {
        let prepared = UploadRequest::new("https://x/")
            .header("Accept", "text/plain")
            .prepare(&config())
            .expect("must prepare");
        assert_eq!(prepared.headers["accept"], "text/plain");

        let prepared = UploadRequest::new("https://x/")
            .json(false)
            .prepare(&config())
            .expect("must prepare");
        assert!(prepared.headers.get("accept").is_none());
    }

    #[test]
    fn blank_uri_counts_as_missing() {
        let request = UploadRequest {
            uri: Some("  ".to_owned()),
            url: Some(String::new()),
            ..UploadRequest::default()
        };
        assert_eq!(request.target(), None);
        let err = request.prepare(&config()).expect_err("must reject");
        assert!(matches!(err, UploadError::InvalidRequest(_)));

        let request = UploadRequest {
            uri: Some(String::new()),
            url: Some("https://b/".to_owned()),
            ..UploadRequest::default()
        };
        assert_eq!(request.target(), Some("https://b/"));
    }

    #[test]
    fn method_is_case_insensitive() {
        let prepared = UploadRequest::new("https://x/")
            .method("post")
            .json(false)
            .prepare(&config())
            .expect("must prepare");
        assert_eq!(prepared.method, Method::POST);
        assert!(!prepared.json);
    }

    #[test]
    fn content_type_is_left_to_the_multipart_body() {
        let prepared = UploadRequest::new("https://x/")
            .header("Content-Type", "application/json")
            .header("api_key", "k")
            .prepare(&config())
            .expect("must prepare");
        assert!(prepared.headers.get("content-type").is_none());
        assert_eq!(prepared.headers["api_key"], "k");
    }

    #[test]
    fn invalid_header_name_is_invalid_request() {
        let err = UploadRequest::new("https://x/")
            .header("bad header", "v")
            .prepare(&config())
            .expect_err("must reject");
        assert!(matches!(err, UploadError::InvalidRequest(_)));
    }

    #[test]
    fn form_data_is_read_from_camel_case_key() {
        let request = UploadRequest::from_value(json!({
            "uri": "https://x/",
            "formData": {"asset[title]": "cover"}
        }))
        .expect("object parses");
        assert_eq!(request.form_data["asset[title]"], "cover");
    }
}
