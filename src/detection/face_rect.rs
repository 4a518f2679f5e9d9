//! Microsoft Face API (Project Oxford) detection.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::MsConfig;
use crate::error::FaceCropError;
use crate::geometry::Point;
use crate::http::{HttpRequest, HttpTransport};
use crate::locator::Locator;

use super::{parse_json, read_local_file, DetectionResult};

/// Registry name of this provider.
pub const NAME: &str = "ms";

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Face detection through the Face API `detect` endpoint, which answers with
/// one rectangle per face.
pub struct RemoteFaceRectProvider {
    endpoint: String,
    api_token: String,
    transport: Arc<dyn HttpTransport>,
}

impl RemoteFaceRectProvider {
    /// Creates the provider. Fails when no subscription key is configured.
    pub fn new(config: &MsConfig, transport: Arc<dyn HttpTransport>) -> Result<Self, FaceCropError> {
        let api_token = config
            .api_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| FaceCropError::Configuration {
                provider: NAME.to_string(),
                message: "no API token: set MS_FACE_API_TOKEN or ms.api_token".to_string(),
            })?;
        Ok(Self {
            endpoint: config.endpoint().to_string(),
            api_token: api_token.to_string(),
            transport,
        })
    }

    pub fn detect(&self, locator: &str) -> Result<DetectionResult, FaceCropError> {
        let request = self.build_request(&Locator::classify(locator))?;
        let response = self.transport.send(request)?;
        if response.status != 200 {
            return Err(response.into_detection_error(NAME));
        }

        let raw = parse_json(NAME, &response.body)?;
        let points =
            normalize(&raw).map_err(|source| FaceCropError::parse(NAME, &response.body, source))?;
        Ok(DetectionResult::new(locator, points, raw))
    }

    /// Builds the detect request: raw bytes for local files, a JSON `url`
    /// document otherwise.
    pub fn build_request(&self, locator: &Locator) -> Result<HttpRequest, FaceCropError> {
        let request = match locator {
            Locator::Local(path) => HttpRequest::post(self.endpoint.clone(), read_local_file(path)?)
                .header("Content-Type", "application/octet-stream"),
            Locator::Gcs(uri) | Locator::Remote(uri) => {
                let body = json!({ "url": uri }).to_string().into_bytes();
                HttpRequest::post(self.endpoint.clone(), body)
                    .header("Content-Type", "application/json")
            }
        };
        Ok(request.header(SUBSCRIPTION_KEY_HEADER, &self.api_token))
    }
}

/// Extracts points from a detect response.
///
/// Every rectangle yields its corners in the order top-left, bottom-left,
/// bottom-right, top-right.
pub fn normalize(raw: &Value) -> Result<Vec<Point>, serde_json::Error> {
    let faces = Vec::<DetectedFace>::deserialize(raw)?;
    Ok(faces
        .iter()
        .flat_map(|face| face.face_rectangle.corners())
        .collect())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectedFace {
    face_rectangle: FaceRectangle,
}

#[derive(Deserialize)]
struct FaceRectangle {
    left: i64,
    top: i64,
    width: i64,
    height: i64,
}

impl FaceRectangle {
    fn corners(&self) -> [Point; 4] {
        let right = self.left.saturating_add(self.width);
        let bottom = self.top.saturating_add(self.height);
        [
            Point::new(self.left, self.top),
            Point::new(self.left, bottom),
            Point::new(right, bottom),
            Point::new(right, self.top),
        ]
    }
}
