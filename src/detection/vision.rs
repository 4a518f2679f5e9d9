//! Google Cloud Vision face detection.
//!
//! Local images are sent inline as base64 content; anything with a scheme is
//! sent as a `gcsImageUri` reference for the API to fetch itself. The API only
//! accepts `gs://` references there, but other URIs are passed along anyway
//! (with a warning) and left for the backend to reject.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::GcpConfig;
use crate::error::FaceCropError;
use crate::geometry::Point;
use crate::http::{HttpRequest, HttpTransport};
use crate::locator::Locator;

use super::credentials::GcpCredential;
use super::{parse_json, read_local_file, DetectionResult};

/// Registry name of this provider.
pub const NAME: &str = "gcp";

/// Candidate faces requested per image.
pub const MAX_RESULTS: u32 = 4;

/// Face detection through the Vision `images:annotate` endpoint.
pub struct RemoteVisionProvider {
    endpoint: String,
    credential: GcpCredential,
    transport: Arc<dyn HttpTransport>,
}

impl RemoteVisionProvider {
    /// Creates the provider, resolving credentials up front.
    pub fn new(config: &GcpConfig, transport: Arc<dyn HttpTransport>) -> Result<Self, FaceCropError> {
        Ok(Self::with_credential(
            config.endpoint(),
            GcpCredential::resolve(config)?,
            transport,
        ))
    }

    pub fn with_credential(
        endpoint: &str,
        credential: GcpCredential,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            credential,
            transport,
        }
    }

    pub fn detect(&self, locator: &str) -> Result<DetectionResult, FaceCropError> {
        let payload = build_payload(&Locator::classify(locator))?;
        let request = HttpRequest::post(self.endpoint.clone(), payload.to_string().into_bytes())
            .header("Content-Type", "application/json");
        let request = self.credential.authorize(request, self.transport.as_ref())?;

        let response = self.transport.send(request)?;
        if !response.is_success() {
            return Err(response.into_detection_error(NAME));
        }

        let raw = parse_json(NAME, &response.body)?;
        let parsed = AnnotateResponse::deserialize(&raw)
            .map_err(|source| FaceCropError::parse(NAME, &response.body, source))?;
        if let Some(status) = parsed.responses.iter().find_map(|entry| entry.error.as_ref()) {
            return Err(FaceCropError::Detection {
                provider: NAME.to_string(),
                status: u16::try_from(status.code).unwrap_or_default(),
                reason: status.message.clone(),
                body: response.body_text(),
            });
        }

        Ok(DetectionResult::new(locator, parsed.points(), raw))
    }
}

/// Builds the `images:annotate` request body for one image.
pub fn build_payload(locator: &Locator) -> Result<Value, FaceCropError> {
    let image = match locator {
        Locator::Local(path) => {
            let content = BASE64.encode(read_local_file(path)?);
            json!({ "content": content })
        }
        Locator::Gcs(uri) => json!({ "source": { "gcsImageUri": uri } }),
        Locator::Remote(uri) => {
            log::warn!("Must be a GCS URI (gs://bucket/object): {uri}");
            json!({ "source": { "gcsImageUri": uri } })
        }
    };

    Ok(json!({
        "requests": [{
            "image": image,
            "features": [{
                "type": "FACE_DETECTION",
                "maxResults": MAX_RESULTS,
            }],
        }],
    }))
}

/// Extracts points from an `images:annotate` response.
///
/// Both the tight `fdBoundingPoly` and the looser `boundingPoly` of every face
/// contribute their vertices, so one face yields up to eight points. Missing
/// coordinates are 0.
pub fn normalize(raw: &Value) -> Result<Vec<Point>, serde_json::Error> {
    AnnotateResponse::deserialize(raw).map(|parsed| parsed.points())
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct AnnotateResponse {
    responses: Vec<ImageResponse>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct ImageResponse {
    face_annotations: Vec<FaceAnnotation>,
    error: Option<Status>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct FaceAnnotation {
    fd_bounding_poly: BoundingPoly,
    bounding_poly: BoundingPoly,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct BoundingPoly {
    vertices: Vec<Vertex>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Vertex {
    x: i64,
    y: i64,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Status {
    code: i64,
    message: String,
}

impl AnnotateResponse {
    fn points(&self) -> Vec<Point> {
        self.responses
            .iter()
            .flat_map(|response| &response.face_annotations)
            .flat_map(|annotation| [&annotation.fd_bounding_poly, &annotation.bounding_poly])
            .flat_map(|poly| &poly.vertices)
            .map(|vertex| Point::new(vertex.x, vertex.y))
            .collect()
    }
}
