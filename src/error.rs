use std::path::PathBuf;
use thiserror::Error;

/// The main error type for facecrop operations.
#[derive(Debug, Error)]
pub enum FaceCropError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error for provider '{provider}': {message}")]
    Configuration { provider: String, message: String },

    #[error("Failed to read config file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("detection failed ({provider}): status={status}, reason={reason}, content={body}")]
    Detection {
        provider: String,
        status: u16,
        reason: String,
        body: String,
    },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Failed to parse {provider} response: {source} (payload: {fragment})")]
    Parse {
        provider: String,
        fragment: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read image dimensions of {locator}: {source}")]
    Decode {
        locator: String,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("No points to bound for {locator}: nothing to crop")]
    EmptyPoints { locator: String },

    #[error("Failed to sign service account token: {0}")]
    TokenSigning(#[from] jsonwebtoken::errors::Error),

    #[error("Unknown detection provider: {0}")]
    UnknownProvider(String),

    #[error("Unknown crop encoder: {0}")]
    UnknownCrop(String),
}

/// Longest payload excerpt carried by a [`FaceCropError::Parse`].
const FRAGMENT_LIMIT: usize = 200;

impl FaceCropError {
    /// Builds a parse error, keeping only the head of the offending payload.
    pub fn parse(provider: &str, payload: &[u8], source: serde_json::Error) -> Self {
        let text = String::from_utf8_lossy(payload);
        let fragment: String = text.chars().take(FRAGMENT_LIMIT).collect();
        FaceCropError::Parse {
            provider: provider.to_string(),
            fragment,
            source,
        }
    }
}
