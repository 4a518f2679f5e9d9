//! Crop URL encoders.
//!
//! An encoder takes a [`DetectionResult`], bounds its points with the
//! smallest axis-aligned rectangle, and writes that rectangle into the image
//! URL as CDN transformation directives. Encoding is pure: no I/O happens.
//!
//! # Example
//!
//! ```
//! use facecrop::crop::{AkamaiCrop, CropOptions};
//! use facecrop::detection::DetectionResult;
//! use facecrop::geometry::Point;
//!
//! let result = DetectionResult::new(
//!     "https://example.com/example.jpg",
//!     vec![Point::new(20, 30), Point::new(25, 24), Point::new(29, 21)],
//!     serde_json::Value::Null,
//! );
//! let url = AkamaiCrop.encode(&result, &CropOptions::default()).unwrap();
//! assert_eq!(url, "https://example.com/example.jpg?crop=9:10%3B20,21&resize=*:*");
//! ```

pub mod akamai;
pub mod query;

pub use akamai::AkamaiCrop;
pub use query::QueryUrl;

use crate::detection::DetectionResult;
use crate::error::FaceCropError;
use crate::geometry::Rect;

/// Placeholder letting the CDN keep the original dimension.
pub const WILDCARD: &str = "*";

/// Default placement of a cropped foreground on its background.
pub const DEFAULT_COMPOSITE_TO: &str = "*.*";

/// Resize and composite settings applied on top of the crop.
///
/// Unset dimensions fall back to [`WILDCARD`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CropOptions {
    pub width: Option<String>,
    pub height: Option<String>,
    /// Background image URL; when set the crop is composited onto it.
    pub background: Option<String>,
    pub composite_to: Option<String>,
    pub bg_width: Option<String>,
    pub bg_height: Option<String>,
}

impl CropOptions {
    pub fn width(&self) -> &str {
        self.width.as_deref().unwrap_or(WILDCARD)
    }

    pub fn height(&self) -> &str {
        self.height.as_deref().unwrap_or(WILDCARD)
    }

    pub fn composite_to(&self) -> &str {
        self.composite_to.as_deref().unwrap_or(DEFAULT_COMPOSITE_TO)
    }

    pub fn bg_width(&self) -> &str {
        self.bg_width.as_deref().unwrap_or(WILDCARD)
    }

    pub fn bg_height(&self) -> &str {
        self.bg_height.as_deref().unwrap_or(WILDCARD)
    }
}

/// A configured crop encoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CropEncoder {
    Akamai(AkamaiCrop),
}

impl CropEncoder {
    pub fn encode(
        &self,
        result: &DetectionResult,
        options: &CropOptions,
    ) -> Result<String, FaceCropError> {
        match self {
            CropEncoder::Akamai(encoder) => encoder.encode(result, options),
        }
    }
}

impl From<AkamaiCrop> for CropEncoder {
    fn from(encoder: AkamaiCrop) -> Self {
        CropEncoder::Akamai(encoder)
    }
}

/// Smallest rectangle containing every detected point.
///
/// Zero points cannot be cropped: that is reported as
/// [`FaceCropError::EmptyPoints`] so callers can tell "no face found" apart
/// from backend failures.
pub fn bounding_rect(result: &DetectionResult) -> Result<Rect, FaceCropError> {
    Rect::bounding(result.points()).ok_or_else(|| FaceCropError::EmptyPoints {
        locator: result.source().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use serde_json::Value;

    #[test]
    fn options_default_to_wildcards() {
        let options = CropOptions::default();
        assert_eq!(options.width(), "*");
        assert_eq!(options.height(), "*");
        assert_eq!(options.bg_width(), "*");
        assert_eq!(options.bg_height(), "*");
        assert_eq!(options.composite_to(), "*.*");
    }

    #[test]
    fn bounding_rect_is_componentwise() {
        let result = DetectionResult::new(
            "a.jpg",
            vec![Point::new(20, 30), Point::new(25, 24), Point::new(29, 21)],
            Value::Null,
        );
        let rect = bounding_rect(&result).expect("rect");
        assert_eq!(rect.min, Point::new(20, 21));
        assert_eq!(rect.max, Point::new(29, 30));
    }

    #[test]
    fn bounding_rect_of_nothing_is_empty_points() {
        let result = DetectionResult::new("a.jpg", Vec::new(), Value::Null);
        assert!(matches!(
            bounding_rect(&result),
            Err(FaceCropError::EmptyPoints { .. })
        ));
    }

    #[test]
    fn encoder_dispatches_to_akamai() {
        let encoder = CropEncoder::from(AkamaiCrop);
        let result = DetectionResult::new("a.jpg", vec![Point::new(1, 2)], Value::Null);
        assert_eq!(
            encoder.encode(&result, &CropOptions::default()).unwrap(),
            "a.jpg?crop=0:1%3B1,2&resize=*:*"
        );
    }
}
