//! Login and logout.
//!
//! Login is the one backend call issued without a stored access token; it is
//! deliberately not routed through the 401-refresh pipeline.

use reqwest::header;

use tillpoint_core::{CredentialKey, CredentialStore, Secret, SessionTokens};

use crate::client::{ApiClient, TokenPairBody};
use crate::error::ApiError;

impl ApiClient {
    /// Authenticate with email and password.
    ///
    /// On success both returned tokens are persisted before this returns; a
    /// response missing either token persists nothing and fails with
    /// [`ApiError::MissingTokens`].
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionTokens, ApiError> {
        let host = self
            .store
            .get(CredentialKey::Host)
            .await?
            .ok_or(ApiError::HostNotConfigured)?;

        let url = format!("{}/auth/login", self.base_url);
        let response = self
            .http
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .header(header::HOST, host.expose())
            .form(&[("email", email), ("password", password)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::UnexpectedStatus {
                status,
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body: TokenPairBody = response.json().await.map_err(ApiError::Decode)?;
        let (Some(access), Some(refresh)) = (body.access_token, body.refresh_token) else {
            return Err(ApiError::MissingTokens);
        };

        self.store
            .set(CredentialKey::AccessToken, &Secret::new(access.as_str()))
            .await?;
        self.store
            .set(CredentialKey::RefreshToken, &Secret::new(refresh.as_str()))
            .await?;
        tracing::info!("login succeeded, session tokens stored");

        Ok(SessionTokens {
            access_token: Secret::new(access),
            refresh_token: Secret::new(refresh),
            token_type: body.token_type.unwrap_or_else(|| "bearer".to_string()),
            expires_in: body.expires_in,
        })
    }

    /// Drop the stored session tokens.
    ///
    /// The host slot is left untouched; it is only reconfigured manually.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.store.delete(CredentialKey::AccessToken).await?;
        self.store.delete(CredentialKey::RefreshToken).await?;
        tracing::info!("session tokens cleared");
        Ok(())
    }
}
