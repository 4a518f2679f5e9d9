//! Image locator classification.
//!
//! A locator is either a local file path or a URI. The distinction is made
//! purely from syntax: nothing is probed on disk or over the network.

use std::path::{Path, PathBuf};

/// Scheme used by Google Cloud Storage object references.
pub const GCS_SCHEME: &str = "gs";

/// A classified image locator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Locator {
    /// No URI scheme: a path on the local filesystem.
    Local(PathBuf),
    /// A `gs://bucket/object` reference.
    Gcs(String),
    /// Any other URI (`http`, `https`, ...).
    Remote(String),
}

impl Locator {
    pub fn classify(locator: &str) -> Self {
        match scheme(locator) {
            None => Locator::Local(PathBuf::from(locator)),
            Some(scheme) if scheme == GCS_SCHEME => Locator::Gcs(locator.to_string()),
            Some(_) => Locator::Remote(locator.to_string()),
        }
    }

    pub fn local_path(&self) -> Option<&Path> {
        match self {
            Locator::Local(path) => Some(path),
            _ => None,
        }
    }
}

/// True when `locator` has no URI scheme.
pub fn is_local_file(locator: &str) -> bool {
    scheme(locator).is_none()
}

/// True when `locator` is a Google Cloud Storage image URI.
pub fn is_gcs_image_uri(locator: &str) -> bool {
    scheme(locator).as_deref() == Some(GCS_SCHEME)
}

/// The RFC 3986 scheme of `locator`, lowercased: an ASCII letter followed by
/// letters, digits, `+`, `-` or `.`, up to the first `:`. The rest of the
/// locator is not validated.
fn scheme(locator: &str) -> Option<String> {
    let (scheme, _) = locator.split_once(':')?;
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then(|| scheme.to_ascii_lowercase())
}
