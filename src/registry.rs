//! Named lookup of detection providers and crop encoders.
//!
//! The registry is built once at startup and only read afterwards. Providers
//! whose configuration is incomplete are not registered; their configuration
//! error is remembered instead and reported when that name is requested, so
//! `gcp` without credentials fails with the real cause rather than "unknown
//! provider".

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::Config;
use crate::crop::{self, AkamaiCrop, CropEncoder};
use crate::detection::{
    face_rect, vision, whole_image, DetectionProvider, RemoteFaceRectProvider,
    RemoteVisionProvider, WholeImageProvider,
};
use crate::error::FaceCropError;
use crate::http::HttpTransport;

#[derive(Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, DetectionProvider>,
    unavailable: BTreeMap<String, String>,
    encoders: BTreeMap<String, CropEncoder>,
}

impl ProviderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every built-in provider and encoder that `config` allows.
    pub fn from_config(config: &Config, transport: Arc<dyn HttpTransport>) -> Self {
        let mut registry = Self::new();

        match RemoteVisionProvider::new(&config.gcp, transport.clone()) {
            Ok(provider) => registry.register_provider(vision::NAME, provider),
            Err(err) => registry.mark_unavailable(vision::NAME, err),
        }
        match RemoteFaceRectProvider::new(&config.ms, transport.clone()) {
            Ok(provider) => registry.register_provider(face_rect::NAME, provider),
            Err(err) => registry.mark_unavailable(face_rect::NAME, err),
        }
        registry.register_provider(whole_image::NAME, WholeImageProvider::new(transport));
        registry.register_encoder(crop::akamai::NAME, AkamaiCrop);

        registry
    }

    /// Registers (or replaces) a provider under `name`.
    pub fn register_provider(&mut self, name: &str, provider: impl Into<DetectionProvider>) {
        self.unavailable.remove(name);
        self.providers.insert(name.to_string(), provider.into());
    }

    /// Registers (or replaces) a crop encoder under `name`.
    pub fn register_encoder(&mut self, name: &str, encoder: impl Into<CropEncoder>) {
        self.encoders.insert(name.to_string(), encoder.into());
    }

    fn mark_unavailable(&mut self, name: &str, err: FaceCropError) {
        log::debug!("provider '{name}' not available: {err}");
        let message = match err {
            FaceCropError::Configuration { message, .. } => message,
            other => other.to_string(),
        };
        self.unavailable.insert(name.to_string(), message);
    }

    /// Looks up a detection provider by name.
    pub fn provider(&self, name: &str) -> Result<&DetectionProvider, FaceCropError> {
        if let Some(provider) = self.providers.get(name) {
            return Ok(provider);
        }
        match self.unavailable.get(name) {
            Some(message) => Err(FaceCropError::Configuration {
                provider: name.to_string(),
                message: message.clone(),
            }),
            None => Err(FaceCropError::UnknownProvider(format!(
                "'{}' (available: {})",
                name,
                self.provider_names().join(", ")
            ))),
        }
    }

    /// Looks up a crop encoder by name.
    pub fn encoder(&self, name: &str) -> Result<&CropEncoder, FaceCropError> {
        self.encoders.get(name).ok_or_else(|| {
            FaceCropError::UnknownCrop(format!(
                "'{}' (available: {})",
                name,
                self.encoders.keys().cloned().collect::<Vec<_>>().join(", ")
            ))
        })
    }

    /// Names of usable providers, sorted.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }
}
