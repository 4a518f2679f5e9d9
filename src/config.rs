//! Backend configuration.
//!
//! Configuration comes from an optional YAML file; the CLI then layers
//! command-line and environment values on top via the `with_*` setters.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::FaceCropError;
use crate::http::DEFAULT_TIMEOUT;

/// Default Google Cloud Vision annotate endpoint.
pub const DEFAULT_VISION_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Default Microsoft Face API detect endpoint.
pub const DEFAULT_FACE_RECT_ENDPOINT: &str =
    "https://api.projectoxford.ai/face/v1.0/detect?returnFaceId=true&returnFaceLandmarks=true";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub gcp: GcpConfig,
    pub ms: MsConfig,
    pub http: HttpConfig,
}

/// Google Cloud Vision settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GcpConfig {
    /// API key sent as the `key` query parameter.
    pub api_key: Option<String>,
    /// Path to a service account JSON file.
    pub credentials: Option<PathBuf>,
    pub endpoint: Option<String>,
}

impl GcpConfig {
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_VISION_ENDPOINT)
    }
}

/// Microsoft Face API settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MsConfig {
    /// Subscription key sent as `Ocp-Apim-Subscription-Key`.
    pub api_token: Option<String>,
    pub endpoint: Option<String>,
}

impl MsConfig {
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_FACE_RECT_ENDPOINT)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub timeout_secs: Option<u64>,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }
}

impl Config {
    /// Reads a YAML config file.
    pub fn from_file(path: &Path) -> Result<Self, FaceCropError> {
        let text = std::fs::read_to_string(path).map_err(|source| FaceCropError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text).map_err(|source| FaceCropError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses a YAML config document. An empty document yields the defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    pub fn with_gcp_api_key(mut self, api_key: Option<String>) -> Self {
        if api_key.is_some() {
            self.gcp.api_key = api_key;
        }
        self
    }

    pub fn with_gcp_credentials(mut self, credentials: Option<PathBuf>) -> Self {
        if credentials.is_some() {
            self.gcp.credentials = credentials;
        }
        self
    }

    pub fn with_ms_api_token(mut self, api_token: Option<String>) -> Self {
        if api_token.is_some() {
            self.ms.api_token = api_token;
        }
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: Option<u64>) -> Self {
        if timeout_secs.is_some() {
            self.http.timeout_secs = timeout_secs;
        }
        self
    }
}
