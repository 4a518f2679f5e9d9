//! Google Cloud credential resolution.
//!
//! Two credential kinds are supported: a plain API key, or a service account
//! key file whose private key signs a JWT that is exchanged for a short-lived
//! OAuth access token on every detection call.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::config::GcpConfig;
use crate::error::FaceCropError;
use crate::http::{HttpRequest, HttpTransport};

use super::parse_json;

const PROVIDER: &str = super::vision::NAME;

/// OAuth scope requested for Vision API calls.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: u64 = 3600;

/// A resolved credential for the Vision API.
pub enum GcpCredential {
    ApiKey(String),
    ServiceAccount(ServiceAccount),
}

/// A parsed service account key with its signing key ready to use.
pub struct ServiceAccount {
    client_email: String,
    token_uri: String,
    key_id: Option<String>,
    signing_key: EncodingKey,
}

/// The fields of a service account JSON file that token exchange needs.
#[derive(Deserialize)]
struct ServiceAccountFile {
    client_email: String,
    private_key: String,
    #[serde(default)]
    private_key_id: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl GcpCredential {
    /// Resolves a credential from configuration, preferring an API key.
    pub fn resolve(config: &GcpConfig) -> Result<Self, FaceCropError> {
        if let Some(api_key) = config.api_key.as_deref().filter(|key| !key.is_empty()) {
            return Ok(GcpCredential::ApiKey(api_key.to_string()));
        }
        if let Some(path) = &config.credentials {
            return ServiceAccount::from_file(path).map(GcpCredential::ServiceAccount);
        }
        Err(configuration_error(
            "no credentials: set GOOGLE_API_KEY or GOOGLE_APPLICATION_CREDENTIALS",
        ))
    }

    /// Attaches the credential to an outgoing Vision request.
    ///
    /// For service accounts this performs the token exchange through
    /// `transport` first.
    pub fn authorize(
        &self,
        request: HttpRequest,
        transport: &dyn HttpTransport,
    ) -> Result<HttpRequest, FaceCropError> {
        match self {
            GcpCredential::ApiKey(api_key) => {
                let mut url = url::Url::parse(&request.url).map_err(|source| {
                    configuration_error(&format!("invalid endpoint '{}': {source}", request.url))
                })?;
                url.query_pairs_mut().append_pair("key", api_key);
                Ok(HttpRequest {
                    url: url.to_string(),
                    ..request
                })
            }
            GcpCredential::ServiceAccount(account) => {
                let token = account.fetch_access_token(transport)?;
                Ok(request.header("Authorization", &format!("Bearer {token}")))
            }
        }
    }
}

impl std::fmt::Debug for GcpCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GcpCredential::ApiKey(_) => f.write_str("ApiKey(..)"),
            GcpCredential::ServiceAccount(account) => std::fmt::Debug::fmt(account, f),
        }
    }
}

impl std::fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccount {
    /// Loads a service account key file.
    pub fn from_file(path: &Path) -> Result<Self, FaceCropError> {
        let text = std::fs::read_to_string(path).map_err(|source| {
            configuration_error(&format!(
                "cannot read credentials file {}: {source}",
                path.display()
            ))
        })?;
        Self::from_json_str(&text).map_err(|err| match err {
            FaceCropError::Configuration { message, .. } => {
                configuration_error(&format!("{}: {message}", path.display()))
            }
            other => other,
        })
    }

    pub fn from_json_str(text: &str) -> Result<Self, FaceCropError> {
        let file: ServiceAccountFile = serde_json::from_str(text)
            .map_err(|source| configuration_error(&format!("malformed service account: {source}")))?;
        let signing_key = EncodingKey::from_rsa_pem(file.private_key.as_bytes())
            .map_err(|source| configuration_error(&format!("unusable private key: {source}")))?;
        Ok(Self {
            client_email: file.client_email,
            token_uri: file
                .token_uri
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
            key_id: file.private_key_id,
            signing_key,
        })
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    /// Builds the signed JWT assertion presented to the token endpoint.
    pub fn assertion(&self, issued_at: u64) -> Result<String, FaceCropError> {
        let claims = Claims {
            iss: &self.client_email,
            scope: CLOUD_PLATFORM_SCOPE,
            aud: &self.token_uri,
            iat: issued_at,
            exp: issued_at + TOKEN_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id.clone();
        Ok(jsonwebtoken::encode(&header, &claims, &self.signing_key)?)
    }

    fn fetch_access_token(&self, transport: &dyn HttpTransport) -> Result<String, FaceCropError> {
        let issued_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        let assertion = self.assertion(issued_at)?;
        let form = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", JWT_BEARER_GRANT)
            .append_pair("assertion", &assertion)
            .finish();

        let request = HttpRequest::post(self.token_uri.clone(), form.into_bytes())
            .header("Content-Type", "application/x-www-form-urlencoded");
        let response = transport.send(request)?;
        if !response.is_success() {
            return Err(response.into_detection_error(PROVIDER));
        }

        let raw = parse_json(PROVIDER, &response.body)?;
        let token = TokenResponse::deserialize(&raw)
            .map_err(|source| FaceCropError::parse(PROVIDER, &response.body, source))?;
        Ok(token.access_token)
    }
}

fn configuration_error(message: &str) -> FaceCropError {
    FaceCropError::Configuration {
        provider: PROVIDER.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::http::testing::StubTransport;

    pub(crate) const TEST_KEY: &str = include_str!("../../tests/fixtures/test_rsa_key.pem");

    pub(crate) fn service_account_json(token_uri: &str) -> String {
        serde_json::json!({
            "type": "service_account",
            "client_email": "cropper@project.iam.gserviceaccount.com",
            "private_key_id": "key-1",
            "private_key": TEST_KEY,
            "token_uri": token_uri,
        })
        .to_string()
    }

    #[test]
    fn api_key_wins_over_credentials_file() {
        let config = GcpConfig {
            api_key: Some("k".into()),
            credentials: Some("/does/not/exist.json".into()),
            endpoint: None,
        };
        let credential = GcpCredential::resolve(&config).expect("resolve");
        assert!(matches!(credential, GcpCredential::ApiKey(ref key) if key == "k"));
        assert_eq!(format!("{credential:?}"), "ApiKey(..)");
    }

    #[test]
    fn missing_credentials_is_configuration_error() {
        let err = GcpCredential::resolve(&GcpConfig::default()).unwrap_err();
        match err {
            FaceCropError::Configuration { provider, message } => {
                assert_eq!(provider, "gcp");
                assert!(message.contains("GOOGLE_APPLICATION_CREDENTIALS"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unreadable_credentials_file_is_configuration_error() {
        let config = GcpConfig {
            credentials: Some("/does/not/exist.json".into()),
            ..Default::default()
        };
        let err = GcpCredential::resolve(&config).unwrap_err();
        assert!(matches!(err, FaceCropError::Configuration { .. }));
    }

    #[test]
    fn malformed_service_account_is_configuration_error() {
        let err = ServiceAccount::from_json_str(r#"{"client_email": "a@b"}"#).unwrap_err();
        assert!(matches!(err, FaceCropError::Configuration { .. }));

        let err = ServiceAccount::from_json_str(
            r#"{"client_email": "a@b", "private_key": "not a pem"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, FaceCropError::Configuration { .. }));
    }

    #[test]
    fn service_account_file_defaults_token_uri() {
        let json = serde_json::json!({
            "client_email": "a@b",
            "private_key": TEST_KEY,
        })
        .to_string();
        let account = ServiceAccount::from_json_str(&json).expect("parse");
        assert_eq!(account.client_email(), "a@b");
        assert_eq!(account.token_uri, DEFAULT_TOKEN_URI);
    }

    #[test]
    fn assertion_is_a_signed_rs256_jwt() {
        let account = ServiceAccount::from_json_str(&service_account_json(DEFAULT_TOKEN_URI))
            .expect("parse");
        let jwt = account.assertion(1_000).expect("sign");
        assert_eq!(jwt.split('.').count(), 3);

        let header = jsonwebtoken::decode_header(&jwt).expect("header");
        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some("key-1"));
    }

    #[test]
    fn api_key_is_appended_to_endpoint() {
        let credential = GcpCredential::ApiKey("secret key".into());
        let transport = StubTransport::new();
        let request = HttpRequest::post("https://vision.example/v1/images:annotate", vec![]);
        let authorized = credential.authorize(request, &transport).expect("authorize");
        assert_eq!(
            authorized.url,
            "https://vision.example/v1/images:annotate?key=secret+key"
        );
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn service_account_exchanges_jwt_for_bearer_token() {
        let account = ServiceAccount::from_json_str(&service_account_json(
            "https://oauth.example/token",
        ))
        .expect("parse");
        let credential = GcpCredential::ServiceAccount(account);
        let transport = StubTransport::new().respond(
            200,
            r#"{"access_token": "ya29.token", "token_type": "Bearer", "expires_in": 3599}"#,
        );

        let request = HttpRequest::post("https://vision.example/annotate", vec![]);
        let authorized = credential.authorize(request, &transport).expect("authorize");
        assert_eq!(
            authorized.header_value("Authorization"),
            Some("Bearer ya29.token")
        );

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, "https://oauth.example/token");
        let form = String::from_utf8(sent[0].body.clone()).expect("utf8");
        assert!(form.starts_with(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer&assertion="
        ));
    }

    #[test]
    fn rejected_token_exchange_is_detection_error() {
        let account = ServiceAccount::from_json_str(&service_account_json(DEFAULT_TOKEN_URI))
            .expect("parse");
        let credential = GcpCredential::ServiceAccount(account);
        let transport = StubTransport::new().respond(400, r#"{"error": "invalid_grant"}"#);

        let err = credential
            .authorize(HttpRequest::post("https://vision.example", vec![]), &transport)
            .unwrap_err();
        match err {
            FaceCropError::Detection { status, body, .. } => {
                assert_eq!(status, 400);
                assert!(body.contains("invalid_grant"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
