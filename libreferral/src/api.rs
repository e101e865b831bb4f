//! HTTP client for the referral API
//!
//! Request/response plumbing only: every call is a single request against
//! the configured base URL, with the session's bearer token attached when
//! one is stored. There is no retry or backoff.

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::config::ApiConfig;
use crate::error::{ApiError, ConfigError, Result};
use crate::session::Session;
use crate::types::{
    Credentials, Diagnostic, Equipment, Hospital, HospitalId, MedicalHistory, NewReferral, Patient,
    PatientId, Referral, TokenPair, User,
};

/// Longest response body excerpt kept in error messages
const MAX_ERROR_BODY: usize = 200;

/// A response that may be either a single object or a list of them
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_first(self) -> Option<T> {
        match self {
            OneOrMany::One(item) => Some(item),
            OneOrMany::Many(items) => items.into_iter().next(),
        }
    }
}

/// Map a transport-level reqwest error to `ApiError`
fn map_transport_error(error: reqwest::Error, path: &str) -> ApiError {
    if error.is_timeout() {
        ApiError::Network(format!("Request to {} timed out: {}", path, error))
    } else if error.is_builder() {
        ApiError::InvalidUrl(format!("{}: {}", path, error))
    } else {
        ApiError::Network(format!("Request to {} failed: {}", path, error))
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_ERROR_BODY {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(MAX_ERROR_BODY).collect();
        format!("{}...", cut)
    }
}

/// Client for the referral REST API
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    /// Create a client for the configured base URL
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL is not http(s) or the
    /// HTTP client cannot be built.
    pub fn new(config: &ApiConfig, session: Session) -> Result<Self> {
        let base_url = config.normalized_base_url()?;

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("libreferral/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ConfigError::InvalidValue(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Request without the session's bearer token
    ///
    /// Used for the endpoints that issue tokens or create accounts, which
    /// must not carry a stale or foreign credential.
    fn anonymous_request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let mut request = self.anonymous_request(method, path);
        if let Some(token) = self.session.token()? {
            request = request.bearer_auth(token);
        }
        Ok(request)
    }

    /// Send a request and return the body of a successful response
    async fn send(&self, request: RequestBuilder, path: &str) -> Result<String> {
        let response = request
            .send()
            .await
            .map_err(|e| map_transport_error(e, path))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| map_transport_error(e, path))?;

        tracing::debug!(path, status = status.as_u16(), "API response");

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized(format!("{}: {}", path, excerpt(&body))).into());
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                path: path.to_string(),
                status: status.as_u16(),
                message: excerpt(&body),
            }
            .into());
        }

        Ok(body)
    }

    fn decode<T: DeserializeOwned>(body: &str, path: &str) -> Result<T> {
        serde_json::from_str(body).map_err(|e| {
            ApiError::Decode {
                path: path.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        tracing::debug!(path, ?query, "GET");
        let request = self.request(Method::GET, path)?.query(query);
        let body = self.send(request, path).await?;
        Self::decode(&body, path)
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, payload: &B) -> Result<String> {
        tracing::debug!(path, "POST");
        let request = self.request(Method::POST, path)?.json(payload);
        self.send(request, path).await
    }

    async fn post_anonymous<B: Serialize + ?Sized>(&self, path: &str, payload: &B) -> Result<String> {
        tracing::debug!(path, "POST without session");
        let request = self.anonymous_request(Method::POST, path).json(payload);
        self.send(request, path).await
    }

    fn patient_filter(patient: Option<PatientId>) -> Vec<(&'static str, String)> {
        patient
            .map(|id| vec![("patient", id.to_string())])
            .unwrap_or_default()
    }

    // === Authentication ===

    /// Exchange credentials for a token pair (`POST /token/`)
    pub async fn obtain_token(&self, credentials: &Credentials) -> Result<TokenPair> {
        let path = "/token/";
        let body = self
            .post_anonymous(
                path,
                &json!({
                    "username": credentials.username,
                    "password": credentials.password.expose_secret(),
                }),
            )
            .await?;
        Self::decode(&body, path)
    }

    /// Create a user account (`POST /users/`)
    pub async fn register_user(&self, credentials: &Credentials) -> Result<()> {
        self.post_anonymous(
            "/users/",
            &json!({
                "username": credentials.username,
                "password": credentials.password.expose_secret(),
            }),
        )
        .await?;
        Ok(())
    }

    /// Look up a user by username (`GET /users/?username=`)
    ///
    /// The endpoint answers with either a single user or a filtered list;
    /// the first match is returned.
    pub async fn find_user(&self, username: &str) -> Result<Option<User>> {
        let users: OneOrMany<User> = self
            .get("/users/", &[("username", username.to_string())])
            .await?;
        Ok(users.into_first())
    }

    // === Collections ===

    pub async fn list_hospitals(&self) -> Result<Vec<Hospital>> {
        self.get("/hospitals", &[]).await
    }

    pub async fn get_hospital(&self, id: HospitalId) -> Result<Hospital> {
        self.get(&format!("/hospitals/{}", id), &[]).await
    }

    pub async fn list_patients(&self) -> Result<Vec<Patient>> {
        self.get("/patients", &[]).await
    }

    pub async fn list_medical_history(&self, patient: Option<PatientId>) -> Result<Vec<MedicalHistory>> {
        self.get("/medical-history", &Self::patient_filter(patient))
            .await
    }

    pub async fn list_diagnostics(&self, patient: Option<PatientId>) -> Result<Vec<Diagnostic>> {
        self.get("/diagnostics", &Self::patient_filter(patient))
            .await
    }

    pub async fn list_referrals(&self, patient: Option<PatientId>) -> Result<Vec<Referral>> {
        self.get("/referrals", &Self::patient_filter(patient)).await
    }

    /// List equipment, optionally filtered by name (`?equipment_name=`)
    pub async fn list_equipment(&self, name: Option<&str>) -> Result<Vec<Equipment>> {
        let query: Vec<(&str, String)> = name
            .map(|q| vec![("equipment_name", q.to_string())])
            .unwrap_or_default();
        self.get("/equipment", &query).await
    }

    /// Create a referral (`POST /referrals/`)
    ///
    /// Only the status of the response matters; its body is not decoded.
    pub async fn create_referral(&self, referral: &NewReferral) -> Result<()> {
        self.post("/referrals/", referral).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_base_url() {
        let config = ApiConfig {
            base_url: "ftp://example.com".to_string(),
            timeout_secs: None,
        };
        assert!(ApiClient::new(&config, Session::in_memory()).is_err());
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let config = ApiConfig {
            base_url: "http://localhost:8000/api/".to_string(),
            timeout_secs: Some(5),
        };
        let client = ApiClient::new(&config, Session::in_memory()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api");
    }

    #[test]
    fn test_excerpt_truncates_long_bodies() {
        let body = "x".repeat(MAX_ERROR_BODY + 50);
        let short = excerpt(&body);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), MAX_ERROR_BODY + 3);
    }

    #[test]
    fn test_one_or_many_first() {
        let one: OneOrMany<i64> = serde_json::from_str("4").unwrap();
        assert_eq!(one.into_first(), Some(4));

        let many: OneOrMany<i64> = serde_json::from_str("[7, 8]").unwrap();
        assert_eq!(many.into_first(), Some(7));

        let none: OneOrMany<i64> = serde_json::from_str("[]").unwrap();
        assert_eq!(none.into_first(), None);
    }

    #[test]
    fn test_patient_filter() {
        assert!(ApiClient::patient_filter(None).is_empty());
        assert_eq!(
            ApiClient::patient_filter(Some(12)),
            vec![("patient", "12".to_string())]
        );
    }
}
