//! Minimal HTTP seam used by the remote providers.
//!
//! Providers build an [`HttpRequest`] and hand it to an [`HttpTransport`].
//! The production transport is backed by `ureq`; tests substitute a stub.

use std::time::Duration;

use crate::error::FaceCropError;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// An outbound request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn post(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body,
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Returns the first header value with the given (case-insensitive) name.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A response as seen by a provider: status line plus the full body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Converts a non-success response into a [`FaceCropError::Detection`].
    pub fn into_detection_error(self, provider: &str) -> FaceCropError {
        FaceCropError::Detection {
            provider: provider.to_string(),
            status: self.status,
            body: self.body_text(),
            reason: self.reason,
        }
    }
}

/// Sends a request and returns whatever status the server answered with.
///
/// Implementations only fail for transport-level problems (DNS, TLS,
/// timeouts); HTTP error statuses are returned as ordinary responses.
pub trait HttpTransport: Send + Sync {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, FaceCropError>;
}

/// [`HttpTransport`] backed by a blocking `ureq` agent.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.into(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl HttpTransport for UreqTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, FaceCropError> {
        log::debug!(
            "{:?} {} ({} byte body)",
            request.method,
            request.url,
            request.body.len()
        );

        let transport_error = |source: ureq::Error| FaceCropError::Transport {
            url: request.url.clone(),
            message: source.to_string(),
        };

        let result = match request.method {
            Method::Get => {
                let mut builder = self.agent.get(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            Method::Post => {
                let mut builder = self.agent.post(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.send(&request.body[..])
            }
        };

        let mut response = result.map_err(transport_error)?;
        let status = response.status();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(transport_error)?;

        log::debug!("{} answered {}", request.url, status.as_u16());

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}
