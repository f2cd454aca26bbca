//! API client for communicating with the student records REST API.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests against the student service gateway: login/logout, the
//! student roster, and per-user messages.

use anyhow::{Context, Result};
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::auth::CredentialScheme;
use crate::models::{AuthResponse, Message, SendMessageResponse, Student};

use super::ApiError;

/// Default base URL for the student service gateway
pub const DEFAULT_API_URL: &str = "http://localhost:9080";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the student service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client against the given base URL.
    ///
    /// Under the cookie-delegated scheme the client keeps a cookie store so
    /// the server's HTTP-only access cookie rides along with every request.
    pub fn new(base_url: impl Into<String>, scheme: CredentialScheme) -> Result<Self> {
        let mut builder =
            Client::builder().timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS));

        if scheme == CredentialScheme::Cookie {
            builder = builder.cookie_store(true);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into(),
            token: None,
        })
    }

    /// Set the bearer token attached to authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Drop the bearer token (after logout)
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send POST request to {}", url))?;

        let response = Self::check_response(response).await?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    // ===== Authentication =====

    /// Authenticate with email and password, returning the token pair and
    /// the logged-in student record
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });
        self.post("/auth/login", &body).await
    }

    /// Invalidate the refresh token server-side. Best-effort: callers
    /// proceed with local logout regardless of the outcome.
    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        let url = self.url("/auth/logout");
        let body = serde_json::json!({ "refreshToken": refresh_token });

        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .json(&body)
            .send()
            .await
            .context("Failed to send logout request")?;

        Self::check_response(response).await?;
        debug!("Server-side logout acknowledged");
        Ok(())
    }

    // ===== Data Fetching Methods =====

    /// Fetch the full student roster
    pub async fn fetch_students(&self) -> Result<Vec<Student>> {
        self.get("/api/students").await
    }

    /// Fetch all messages delivered to the given email address
    pub async fn fetch_messages(&self, email: &str) -> Result<Vec<Message>> {
        let url = self.url("/api/messages");
        let response = self
            .client
            .get(&url)
            .query(&[("email", email)])
            .headers(self.auth_headers()?)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;

        response
            .json()
            .await
            .context("Failed to parse messages response")
    }

    /// Send a message as the logged-in user (the server resolves the
    /// sender from the request credential)
    pub async fn send_message(&self, message: &str) -> Result<SendMessageResponse> {
        let body = serde_json::json!({ "message": message });
        self.post("/api/messages", &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(server.uri(), CredentialScheme::Token)
            .expect("Failed to build test client")
    }

    #[tokio::test]
    async fn test_login_parses_auth_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(serde_json::json!({
                "email": "a@b.com",
                "password": "x",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "accessToken": "T1",
                "refreshToken": "R1",
                "student": {
                    "id": 1,
                    "firstName": "Ada",
                    "lastName": "Lovelace",
                    "email": "a@b.com",
                    "major": "Mathematics",
                    "year": 3,
                },
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resp = client_for(&server)
            .login("a@b.com", "x")
            .await
            .expect("Login should succeed");
        assert_eq!(resp.access_token, "T1");
        assert_eq!(resp.refresh_token, "R1");
        assert_eq!(resp.student.id, 1);
    }

    #[tokio::test]
    async fn test_login_rejection_maps_to_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"error": "invalid email or password"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .login("a@b.com", "wrong")
            .await
            .expect_err("Login should fail");
        let api_err = err
            .downcast_ref::<ApiError>()
            .expect("Should be an ApiError");
        assert!(api_err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_bearer_token_attached_when_session_active() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/students"))
            .and(header("Authorization", "Bearer T1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = client_for(&server);
        client.set_token("T1".to_string());
        let students = client.fetch_students().await.expect("Fetch should succeed");
        assert!(students.is_empty());
    }

    #[tokio::test]
    async fn test_no_bearer_token_without_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/students"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.fetch_students().await.expect("Fetch should succeed");

        let requests = server
            .received_requests()
            .await
            .expect("Request recording enabled");
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_fetch_messages_sends_email_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/messages"))
            .and(query_param("email", "ada@example.edu"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "id": 5,
                "email": "ada@example.edu",
                "message": "Hello",
                "createdAt": "2025-09-14T08:30:00Z",
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let messages = client_for(&server)
            .fetch_messages("ada@example.edu")
            .await
            .expect("Fetch should succeed");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message, "Hello");
    }

    #[tokio::test]
    async fn test_send_message_posts_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/messages"))
            .and(body_json(serde_json::json!({"message": "See you at orientation"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "message": "message sent successfully",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resp = client_for(&server)
            .send_message("See you at orientation")
            .await
            .expect("Send should succeed");
        assert_eq!(resp.status, "success");
    }

    #[tokio::test]
    async fn test_expired_credential_surfaces_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/students"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"error": "unauthorized"})),
            )
            .mount(&server)
            .await;

        let mut client = client_for(&server);
        client.set_token("stale".to_string());
        let err = client
            .fetch_students()
            .await
            .expect_err("Fetch should fail");
        assert!(err
            .downcast_ref::<ApiError>()
            .is_some_and(ApiError::is_unauthorized));
    }
}
