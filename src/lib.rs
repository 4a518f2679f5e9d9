//! Facecrop: face-aware crop URLs for image CDNs.
//!
//! Facecrop asks a face detection backend where the faces in an image are,
//! reduces the backend's answer to a plain list of points, and writes the
//! rectangle bounding those points into the image URL as CDN crop
//! directives.
//!
//! # Modules
//!
//! - [`detection`]: Detection providers and their response normalization
//! - [`crop`]: Bounding rectangle and crop URL encoding
//! - [`registry`]: Named lookup of providers and encoders
//! - [`geometry`]: Point and rectangle types
//! - [`locator`]: Local path vs. URI classification
//! - [`config`]: Backend configuration
//! - [`http`]: HTTP transport seam
//! - [`error`]: Error types for facecrop operations

pub mod config;
pub mod crop;
pub mod detection;
pub mod error;
pub mod geometry;
pub mod http;
pub mod locator;
pub mod registry;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

pub use config::Config;
pub use crop::CropOptions;
pub use detection::DetectionResult;
pub use error::FaceCropError;
pub use registry::ProviderRegistry;

/// The facecrop CLI application.
#[derive(Parser)]
#[command(name = "facecrop")]
#[command(version, about)]
struct Cli {
    /// Detection provider ('gcp', 'ms', or 'all').
    mode: String,

    /// Image URL or local path.
    target: String,

    /// Crop encoder.
    #[arg(long, default_value = "akamai")]
    crop: String,

    /// YAML config file with backend settings.
    #[arg(long, env = "FACECROP_CONFIG")]
    config: Option<PathBuf>,

    /// Google Cloud Vision API key.
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    gcp_api_key: Option<String>,

    /// Google service account key file.
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    gcp_credentials: Option<PathBuf>,

    /// Microsoft Face API subscription key.
    #[arg(long, env = "MS_FACE_API_TOKEN", hide_env_values = true)]
    ms_api_token: Option<String>,

    /// HTTP timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Resize width of the crop (default '*').
    #[arg(long)]
    width: Option<String>,

    /// Resize height of the crop (default '*').
    #[arg(long)]
    height: Option<String>,

    /// Background image URL to composite the crop onto.
    #[arg(long)]
    background: Option<String>,

    /// Placement of the crop on the background (default '*.*').
    #[arg(long)]
    composite_to: Option<String>,

    /// Resize width of the background (default '*').
    #[arg(long)]
    bg_width: Option<String>,

    /// Resize height of the background (default '*').
    #[arg(long)]
    bg_height: Option<String>,

    /// Print the detected points to stderr.
    #[arg(long)]
    print_points: bool,
}

impl Cli {
    fn load_config(&self) -> Result<Config, FaceCropError> {
        let config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        Ok(config
            .with_gcp_api_key(self.gcp_api_key.clone())
            .with_gcp_credentials(self.gcp_credentials.clone())
            .with_ms_api_token(self.ms_api_token.clone())
            .with_timeout_secs(self.timeout))
    }

    fn crop_options(&self) -> CropOptions {
        CropOptions {
            width: self.width.clone(),
            height: self.height.clone(),
            background: self.background.clone(),
            composite_to: self.composite_to.clone(),
            bg_width: self.bg_width.clone(),
            bg_height: self.bg_height.clone(),
        }
    }
}

/// Detects faces in `target` with the provider named `mode` and encodes the
/// result with the encoder named `crop`.
pub fn crop_url(
    registry: &ProviderRegistry,
    mode: &str,
    crop: &str,
    target: &str,
    options: &CropOptions,
) -> Result<(DetectionResult, String), FaceCropError> {
    let provider = registry.provider(mode)?;
    let encoder = registry.encoder(crop)?;
    let result = provider.detect(target)?;
    let url = encoder.encode(&result, options)?;
    Ok((result, url))
}

/// Run the facecrop CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), FaceCropError> {
    let cli = Cli::parse();

    let config = cli.load_config()?;
    let transport = Arc::new(http::UreqTransport::new(config.http.timeout()));
    let registry = ProviderRegistry::from_config(&config, transport);

    let (result, url) = crop_url(
        &registry,
        &cli.mode,
        &cli.crop,
        &cli.target,
        &cli.crop_options(),
    )?;

    if cli.print_points {
        for point in result.points() {
            eprintln!("{},{}", point.x, point.y);
        }
    }
    println!("{url}");
    Ok(())
}
