//! Room service client
//!
//! The network contract the session manager depends on: admin login, room
//! join, and the voted-music fetch used as a liveness probe for recalled
//! user credentials. `RoomService` is object safe so tests can inject fakes;
//! `HttpRoomService` is the shipped binding to the real server.

use crate::room_id::RoomId;
use crate::token::Credential;
pub use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Room service errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status
    #[error("room service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The request never produced a usable response
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// One entry of a user's voted-music list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub music_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_date: Option<DateTime<Utc>>,
    pub like: bool,
}

/// Network contract consumed by the session manager
#[async_trait]
pub trait RoomService: Send + Sync {
    /// Exchange admin credentials for a bearer credential
    async fn login(&self, username: &str, password: &str) -> Result<Credential, ApiError>;

    /// Join a room; unauthenticated, mints a room-scoped credential
    async fn join(&self, room_id: &RoomId) -> Result<Credential, ApiError>;

    /// Fetch the music the credential's user has voted on in the room
    async fn fetch_voted_music(
        &self,
        credential: &Credential,
        room_id: &RoomId,
    ) -> Result<Vec<VoteRecord>, ApiError>;
}

/// Configuration for the HTTP room service binding
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server base URL (e.g. "https://jukebox.example")
    pub base_url: String,

    /// Timeout applied to every request
    pub request_timeout: Duration,
}

impl ApiConfig {
    /// Create a configuration with the given base URL and default timeout
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Read the base URL from the `JUKEBOX_API_URL` environment variable
    pub fn from_env() -> Option<Self> {
        std::env::var("JUKEBOX_API_URL").ok().map(Self::new)
    }

    /// Set the per-request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// HTTP binding of the room service contract
pub struct HttpRoomService {
    config: ApiConfig,
    http: reqwest::Client,
}

impl HttpRoomService {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { config, http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

/// Map a non-2xx response to `ApiError::Status`, keeping the body as detail
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl RoomService for HttpRoomService {
    async fn login(&self, username: &str, password: &str) -> Result<Credential, ApiError> {
        let response = self
            .http
            .post(self.url("/api/admin/login"))
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let token: TokenResponse = check_status(response).await?.json().await?;
        Ok(Credential::new(token.access_token))
    }

    async fn join(&self, room_id: &RoomId) -> Result<Credential, ApiError> {
        let response = self
            .http
            .get(self.url(&format!("/api/room/{}/join", room_id)))
            .send()
            .await?;

        let token: TokenResponse = check_status(response).await?.json().await?;
        Ok(Credential::new(token.access_token))
    }

    async fn fetch_voted_music(
        &self,
        credential: &Credential,
        room_id: &RoomId,
    ) -> Result<Vec<VoteRecord>, ApiError> {
        let response = self
            .http
            .get(self.url(&format!("/api/room/{}/music/voted", room_id)))
            .bearer_auth(credential.as_str())
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }
}
