use serde::Deserialize;

use crate::core::config::GoogleConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::ProviderProfile;

/// Token endpoint response for the authorization-code grant.
#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
}

/// Subset of the OpenID Connect userinfo payload this service consumes.
#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    #[serde(default)]
    email: Option<String>,
}

/// Client for the Google OAuth 2.0 authorization-code handshake.
pub struct GoogleAuthClient {
    config: GoogleConfig,
    http_client: reqwest::Client,
}

impl GoogleAuthClient {
    pub fn new(config: GoogleConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Build the consent-screen URL the browser is redirected to.
    pub fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            self.config.auth_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.callback_url),
            urlencoding::encode("openid email"),
            urlencoding::encode(state),
        )
    }

    /// Exchange the callback `code` for an access token, then fetch the
    /// verified profile it belongs to.
    pub async fn fetch_verified_profile(&self, code: &str) -> Result<ProviderProfile> {
        let token = self.exchange_code(code).await?;
        self.fetch_profile(&token.access_token).await
    }

    async fn exchange_code(&self, code: &str) -> Result<GoogleTokenResponse> {
        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.callback_url.as_str()),
            ("grant_type", "authorization_code"),
        ];

        tracing::debug!("Exchanging authorization code for access token");

        let response = self
            .http_client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::UpstreamAuth(format!("token exchange failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Token endpoint rejected the code: HTTP {} - {}", status, body);
            return Err(AppError::UpstreamAuth(format!(
                "token endpoint answered HTTP {}",
                status
            )));
        }

        response
            .json::<GoogleTokenResponse>()
            .await
            .map_err(|e| AppError::UpstreamAuth(format!("malformed token response: {}", e)))
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile> {
        let response = self
            .http_client
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::UpstreamAuth(format!("userinfo fetch failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Userinfo endpoint answered HTTP {}", status);
            return Err(AppError::UpstreamAuth(format!(
                "userinfo endpoint answered HTTP {}",
                status
            )));
        }

        let info = response
            .json::<GoogleUserInfo>()
            .await
            .map_err(|e| AppError::UpstreamAuth(format!("malformed userinfo response: {}", e)))?;

        // A user row cannot be created without an email address.
        let email = info
            .email
            .ok_or_else(|| AppError::UpstreamAuth("profile carries no email address".to_string()))?;

        Ok(ProviderProfile {
            id: info.sub,
            email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::test_google_config;

    #[test]
    fn authorization_url_carries_the_handshake_parameters() {
        let client = GoogleAuthClient::new(test_google_config());
        let url = client.authorization_url("nonce-123");

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=openid%20email"));
        assert!(url.contains("state=nonce-123"));
        // The redirect URI must be percent-encoded.
        assert!(url.contains(
            "redirect_uri=http%3A%2F%2F127.0.0.1%3A3001%2Fauth%2Fgoogle%2Fcallback"
        ));
    }
}
