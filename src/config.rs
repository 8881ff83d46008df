use std::{collections::BTreeMap, path::Path};

use serde::Deserialize;

use crate::{Result, UploadError};

/// Read-only configuration shared by every upload of a client.
///
/// Only `headers` is consumed; it fills in requests that carry no headers of
/// their own. Other keys of a configuration document are ignored.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct UploadConfig {
    #[serde(default)]
    headers: BTreeMap<String, String>,
}

impl UploadConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration from a set of default headers.
    pub fn with_headers<I, K, V>(headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            headers: headers
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }

    /// Parses a JSON configuration document such as
    /// `{"headers": {"api_key": "...", "authtoken": "..."}}`.
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|err| UploadError::Config(format!("invalid config JSON: {err}")))
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| {
            UploadError::Config(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::from_json_str(&content)
    }

    /// Headers applied to requests that do not set any.
    pub fn default_headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }
}
