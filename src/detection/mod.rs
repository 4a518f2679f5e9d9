//! Face detection providers.
//!
//! Each backend turns an image locator into a [`DetectionResult`]: the
//! locator, the points normalized out of the backend's response, and the raw
//! response kept for diagnostics. Callers only ever see
//! [`DetectionProvider::detect`]; which backend answers is decided by name in
//! the [`ProviderRegistry`](crate::registry::ProviderRegistry).
//!
//! # Providers
//!
//! - [`gcp`](RemoteVisionProvider): Google Cloud Vision face annotations
//! - [`ms`](RemoteFaceRectProvider): Microsoft Face API rectangles
//! - [`all`](WholeImageProvider): the whole image, no backend involved

pub mod credentials;
pub mod face_rect;
pub mod vision;
pub mod whole_image;

use std::path::Path;

use serde_json::Value;

use crate::error::FaceCropError;
use crate::geometry::Point;

pub use credentials::GcpCredential;
pub use face_rect::RemoteFaceRectProvider;
pub use vision::RemoteVisionProvider;
pub use whole_image::WholeImageProvider;

/// Normalized output of any provider.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionResult {
    source: String,
    points: Vec<Point>,
    raw: Value,
}

impl DetectionResult {
    /// Creates a result. Providers call this once their response has been
    /// normalized; `points` may be empty when nothing was detected.
    pub fn new(source: impl Into<String>, points: Vec<Point>, raw: Value) -> Self {
        Self {
            source: source.into(),
            points,
            raw,
        }
    }

    /// The locator the detection ran against.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The backend response the points were extracted from.
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

/// A configured detection backend.
pub enum DetectionProvider {
    RemoteVision(RemoteVisionProvider),
    RemoteFaceRect(RemoteFaceRectProvider),
    WholeImage(WholeImageProvider),
}

impl DetectionProvider {
    /// Runs detection against a local path or URI.
    ///
    /// Each call is independent and attempted exactly once.
    pub fn detect(&self, locator: &str) -> Result<DetectionResult, FaceCropError> {
        let result = match self {
            DetectionProvider::RemoteVision(provider) => provider.detect(locator),
            DetectionProvider::RemoteFaceRect(provider) => provider.detect(locator),
            DetectionProvider::WholeImage(provider) => provider.detect(locator),
        }?;
        log::debug!(
            "{} detected {} point(s) in {}",
            self.backend(),
            result.points().len(),
            locator
        );
        Ok(result)
    }

    /// Short backend name used in logs and errors.
    pub fn backend(&self) -> &'static str {
        match self {
            DetectionProvider::RemoteVision(_) => vision::NAME,
            DetectionProvider::RemoteFaceRect(_) => face_rect::NAME,
            DetectionProvider::WholeImage(_) => whole_image::NAME,
        }
    }
}

impl From<RemoteVisionProvider> for DetectionProvider {
    fn from(provider: RemoteVisionProvider) -> Self {
        DetectionProvider::RemoteVision(provider)
    }
}

impl From<RemoteFaceRectProvider> for DetectionProvider {
    fn from(provider: RemoteFaceRectProvider) -> Self {
        DetectionProvider::RemoteFaceRect(provider)
    }
}

impl From<WholeImageProvider> for DetectionProvider {
    fn from(provider: WholeImageProvider) -> Self {
        DetectionProvider::WholeImage(provider)
    }
}

/// Reads a local image file in full.
pub(crate) fn read_local_file(path: &Path) -> Result<Vec<u8>, FaceCropError> {
    std::fs::read(path).map_err(|source| FaceCropError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses a JSON response body, attributing failures to `provider`.
pub(crate) fn parse_json(provider: &str, body: &[u8]) -> Result<Value, FaceCropError> {
    serde_json::from_slice(body).map_err(|source| FaceCropError::parse(provider, body, source))
}

#[cfg(test)]
pub(crate) mod testing {
    //! Log capture for asserting on warnings emitted during detection.

    use std::cell::RefCell;
    use std::sync::Once;

    use log::{Level, LevelFilter, Log, Metadata, Record};

    thread_local! {
        static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
    }

    struct CaptureLogger;

    impl Log for CaptureLogger {
        fn enabled(&self, _metadata: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            RECORDS.with(|records| {
                records
                    .borrow_mut()
                    .push((record.level(), record.args().to_string()))
            });
        }

        fn flush(&self) {}
    }

    static LOGGER: CaptureLogger = CaptureLogger;
    static INIT: Once = Once::new();

    /// Runs `f` and returns what it logged on the current thread.
    pub(crate) fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, Vec<(Level, String)>) {
        INIT.call_once(|| {
            if log::set_logger(&LOGGER).is_ok() {
                log::set_max_level(LevelFilter::Trace);
            }
        });
        RECORDS.with(|records| records.borrow_mut().clear());
        let value = f();
        let logged = RECORDS.with(|records| records.borrow_mut().drain(..).collect());
        (value, logged)
    }
}
