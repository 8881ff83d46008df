use std::fmt;

use reqwest::header::HeaderMap;

/// Response body, decoded according to the request's `json` flag.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Json(_) => None,
            Self::Text(text) => Some(text),
        }
    }
}

impl fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Successful (2xx/3xx) upload response.
#[derive(Clone, Debug)]
pub struct UploadResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: ResponseBody,
}

/// How the uploader reacts to an HTTP status.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatusClass {
    /// 200..=399, resolve with the response.
    Success,
    /// 429, retry without touching the counter.
    RateLimited,
    /// 500 and above, retry and bump the counter.
    ServerError,
    /// Everything else, terminal.
    Failed,
}

impl StatusClass {
    pub fn of(status: u16) -> Self {
        match status {
            200..=399 => Self::Success,
            429 => Self::RateLimited,
            500.. => Self::ServerError,
            _ => Self::Failed,
        }
    }
}
