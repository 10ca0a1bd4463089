//! The authenticated request pipeline and the refresh procedure.

use std::sync::Arc;

use reqwest::{Method, Response, StatusCode, header};
use serde::Deserialize;
use url::Url;

use tillpoint_core::{CredentialKey, CredentialStore, Secret};

use crate::error::ApiError;

/// Body of an authenticated request.
///
/// Held by value so the 401 retry can rebuild an identical request.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Form(Vec<(&'static str, String)>),
    Json(serde_json::Value),
}

/// Token pair as returned by `/auth/login` and `/auth/refresh`.
///
/// Fields are optional so a partial payload can be detected and rejected
/// instead of failing deserialization.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenPairBody {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Client for the Tillpoint backend API.
///
/// Owns the HTTP transport, the configured base URL, and the credential
/// store handed in at construction. All credential reads and writes go
/// through that store; nothing is cached in memory beyond a single call.
pub struct ApiClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) store: Arc<dyn CredentialStore>,
}

impl ApiClient {
    /// Create a client for the given base URL, e.g. `http://localhost:8000/api`.
    ///
    /// The URL is validated here; a trailing slash is stripped so endpoint
    /// paths concatenate cleanly.
    pub fn new(
        base_url: impl Into<String>,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|source| ApiError::InvalidBaseUrl {
            url: base_url.clone(),
            source,
        })?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            store,
        })
    }

    /// Create a client from a loaded [`ClientConfig`](tillpoint_core::ClientConfig).
    pub fn from_config(
        config: &tillpoint_core::ClientConfig,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, ApiError> {
        Self::new(config.api_base_url.clone(), store)
    }

    /// The configured base URL, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Perform one logical authenticated call against the backend.
    ///
    /// Reads host and access token from the store; if either is absent the
    /// call fails before any network I/O. A `401` response triggers the
    /// refresh procedure once and, on success, a single retry with the newly
    /// stored token. Every other status, success or not, is returned to the
    /// caller unmodified.
    pub async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        body: RequestBody,
    ) -> Result<Response, ApiError> {
        let host = self
            .store
            .get(CredentialKey::Host)
            .await?
            .ok_or(ApiError::HostNotConfigured)?;
        let token = self
            .store
            .get(CredentialKey::AccessToken)
            .await?
            .ok_or(ApiError::NoAccessToken)?;

        let response = self
            .send(method.clone(), endpoint, &body, &host, &token)
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::info!(endpoint, "access token rejected, attempting refresh");
        if !self.refresh().await? {
            tracing::warn!(endpoint, "token refresh failed, surfacing the original 401");
            return Ok(response);
        }

        let token = self
            .store
            .get(CredentialKey::AccessToken)
            .await?
            .ok_or(ApiError::NoAccessToken)?;
        self.send(method, endpoint, &body, &host, &token).await
    }

    /// Exchange the stored refresh token for a new token pair.
    ///
    /// Returns `Ok(false)` when no refresh is possible or the backend
    /// declines: absent host or refresh token, a non-200 status, a payload
    /// missing either token, or a transport failure (caught here, never
    /// propagated). Returns `Ok(true)` only after both new tokens are
    /// persisted. A store write failure is the one error that escapes.
    ///
    /// There is no mutual exclusion across concurrent callers: two requests
    /// hitting 401 at the same time may both refresh, and the later rotation
    /// invalidates the pair the earlier one persisted.
    pub async fn refresh(&self) -> Result<bool, ApiError> {
        let Some(host) = self.store.get(CredentialKey::Host).await? else {
            return Ok(false);
        };
        let Some(refresh_token) = self.store.get(CredentialKey::RefreshToken).await? else {
            return Ok(false);
        };

        let url = format!("{}/auth/refresh", self.base_url);
        let response = match self
            .http
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .header(header::HOST, host.expose())
            .bearer_auth(refresh_token.expose())
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err, "token refresh request failed");
                return Ok(false);
            }
        };

        if response.status() != StatusCode::OK {
            tracing::warn!(status = %response.status(), "token refresh rejected");
            return Ok(false);
        }

        let body: TokenPairBody = match response.json().await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(error = %err, "token refresh response unreadable");
                return Ok(false);
            }
        };

        let (Some(access), Some(refresh)) = (body.access_token, body.refresh_token) else {
            tracing::warn!("token refresh response missing token fields");
            return Ok(false);
        };

        self.store
            .set(CredentialKey::AccessToken, &Secret::new(access))
            .await?;
        self.store
            .set(CredentialKey::RefreshToken, &Secret::new(refresh))
            .await?;

        tracing::info!("access token refreshed");
        Ok(true)
    }

    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        body: &RequestBody,
        host: &Secret,
        token: &Secret,
    ) -> Result<Response, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let request = self
            .http
            .request(method, &url)
            .header(header::ACCEPT, "application/json")
            .header(header::HOST, host.expose())
            .bearer_auth(token.expose());

        let request = match body {
            RequestBody::Empty => request,
            RequestBody::Form(fields) => request.form(fields),
            RequestBody::Json(value) => request.json(value),
        };

        Ok(request.send().await?)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
