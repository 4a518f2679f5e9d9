//! Whole-image "detection".
//!
//! Never calls a recognition backend: the detected region is the full image,
//! so callers without a configured detector still get a uniform crop path.

use std::sync::Arc;

use serde_json::json;

use crate::error::FaceCropError;
use crate::geometry::Point;
use crate::http::{HttpRequest, HttpTransport};
use crate::locator::Locator;

use super::DetectionResult;

/// Registry name of this provider.
pub const NAME: &str = "all";

pub struct WholeImageProvider {
    transport: Arc<dyn HttpTransport>,
}

impl WholeImageProvider {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    pub fn detect(&self, locator: &str) -> Result<DetectionResult, FaceCropError> {
        let (width, height) = match Locator::classify(locator) {
            Locator::Local(path) => read_dimensions(locator, imagesize::size(path))?,
            Locator::Gcs(_) | Locator::Remote(_) => {
                let response = self.transport.send(HttpRequest::get(locator))?;
                if !response.is_success() {
                    return Err(response.into_detection_error(NAME));
                }
                read_dimensions(locator, imagesize::blob_size(&response.body))?
            }
        };

        Ok(DetectionResult::new(
            locator,
            corner_points(width, height),
            json!({ "width": width, "height": height }),
        ))
    }
}

/// The four corners of a `width` x `height` image: upper left, lower left,
/// upper right, lower right.
pub fn corner_points(width: i64, height: i64) -> Vec<Point> {
    vec![
        Point::new(0, 0),
        Point::new(0, height),
        Point::new(width, 0),
        Point::new(width, height),
    ]
}

fn read_dimensions(
    locator: &str,
    size: imagesize::ImageResult<imagesize::ImageSize>,
) -> Result<(i64, i64), FaceCropError> {
    let decode_error = |source| FaceCropError::Decode {
        locator: locator.to_string(),
        source,
    };
    let size = size.map_err(decode_error)?;
    let width = i64::try_from(size.width)
        .map_err(|_| decode_error(imagesize::ImageError::CorruptedImage))?;
    let height = i64::try_from(size.height)
        .map_err(|_| decode_error(imagesize::ImageError::CorruptedImage))?;
    Ok((width, height))
}
