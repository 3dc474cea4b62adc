//! Google provider: authorization-code exchange, tokeninfo verification,
//! userinfo profile, token revocation.

use super::ProfileData;
use super::http::{ProviderHttp, with_query};
use crate::config::GoogleConfig;
use crate::error::{ExchangeError, ProfileError, RevokeError};
use serde::Deserialize;

#[derive(Clone)]
pub struct GoogleProvider {
    http: ProviderHttp,
    config: GoogleConfig,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Subset of the v1 tokeninfo response we verify against.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    issued_to: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

impl GoogleProvider {
    pub fn new(http: ProviderHttp, config: GoogleConfig) -> Self {
        Self { http, config }
    }

    /// One round trip: authorization code -> access token.
    #[tracing::instrument(skip(self, code))]
    pub async fn exchange(&self, code: &str) -> Result<String, ExchangeError> {
        let response = self
            .http
            .post_form(
                &self.config.token_endpoint,
                &[
                    ("code", code),
                    ("client_id", &self.config.client_id),
                    ("client_secret", &self.config.client_secret),
                    // The login page uses the postmessage flow, so the code
                    // was issued without a redirect URI.
                    ("redirect_uri", "postmessage"),
                    ("grant_type", "authorization_code"),
                ],
            )
            .await?;

        if !response.status.is_success() {
            return Err(ExchangeError::Http {
                status: response.status,
                context: response.context(),
            });
        }

        let token: TokenResponse = serde_json::from_slice(&response.body)
            .map_err(|e| ExchangeError::InvalidJson(e.to_string()))?;
        Ok(token.access_token)
    }

    /// Verify the token against tokeninfo (audience + subject), then read
    /// the userinfo profile. Two round trips.
    #[tracing::instrument(skip(self, access_token))]
    pub async fn fetch_profile(&self, access_token: &str) -> Result<ProfileData, ProfileError> {
        let info = self.token_info(access_token).await?;
        let user = self.user_info(access_token).await?;

        // The token's user must be the user whose profile we read.
        if info.user_id != user.id {
            return Err(ProfileError::Verification(
                "Token and given user IDs don't match".to_string(),
            ));
        }

        let subject_id = user
            .id
            .ok_or_else(|| ProfileError::Verification("Userinfo carries no subject id".into()))?;
        let email = user.email.ok_or(ProfileError::MissingEmail)?;

        Ok(ProfileData {
            subject_id,
            name: user.name.unwrap_or_default(),
            email,
            picture_url: user.picture,
        })
    }

    async fn token_info(&self, access_token: &str) -> Result<TokenInfo, ProfileError> {
        let url = with_query(
            &self.config.tokeninfo_endpoint,
            &[("access_token", access_token)],
        );
        let response = self.http.get(&url).await?;
        if !response.status.is_success() {
            return Err(ProfileError::Http {
                status: response.status,
                context: response.context(),
            });
        }
        let info: TokenInfo = serde_json::from_slice(&response.body)
            .map_err(|e| ProfileError::InvalidJson(e.to_string()))?;

        if let Some(error) = info.error {
            return Err(ProfileError::Verification(error));
        }
        if info.issued_to.as_deref() != Some(self.config.client_id.as_str()) {
            return Err(ProfileError::Verification(
                "Token and app client IDs don't match".to_string(),
            ));
        }
        Ok(info)
    }

    async fn user_info(&self, access_token: &str) -> Result<UserInfo, ProfileError> {
        let url = with_query(
            &self.config.userinfo_endpoint,
            &[("access_token", access_token), ("alt", "json")],
        );
        let response = self.http.get(&url).await?;
        if !response.status.is_success() {
            return Err(ProfileError::Http {
                status: response.status,
                context: response.context(),
            });
        }
        serde_json::from_slice(&response.body).map_err(|e| ProfileError::InvalidJson(e.to_string()))
    }

    /// Best-effort revocation at the accounts endpoint.
    #[tracing::instrument(skip(self, access_token))]
    pub async fn revoke(&self, access_token: &str) -> Result<(), RevokeError> {
        let url = with_query(&self.config.revoke_endpoint, &[("token", access_token)]);
        let response = self.http.get(&url).await?;
        if !response.status.is_success() {
            return Err(RevokeError::Http {
                status: response.status,
                context: response.context(),
            });
        }
        Ok(())
    }
}
