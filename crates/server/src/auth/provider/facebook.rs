//! Facebook provider: long-lived token exchange against the Graph API,
//! profile + picture lookup, permission revocation.

use super::ProfileData;
use super::http::{ProviderHttp, with_query};
use crate::config::FacebookConfig;
use crate::error::{ExchangeError, ProfileError, RevokeError};
use serde::Deserialize;

const GRAPH_VERSION: &str = "v2.5";

#[derive(Clone)]
pub struct FacebookProvider {
    http: ProviderHttp,
    config: FacebookConfig,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PictureResponse {
    data: PictureData,
}

#[derive(Debug, Deserialize)]
struct PictureData {
    url: String,
}

impl FacebookProvider {
    pub fn new(http: ProviderHttp, config: FacebookConfig) -> Self {
        Self { http, config }
    }

    /// Exchange the short-lived token the client obtained for a long-lived
    /// one (`fb_exchange_token` grant). One round trip.
    #[tracing::instrument(skip(self, short_lived_token))]
    pub async fn exchange(&self, short_lived_token: &str) -> Result<String, ExchangeError> {
        let url = with_query(
            &format!("{}/oauth/access_token", self.config.graph_base),
            &[
                ("grant_type", "fb_exchange_token"),
                ("client_id", &self.config.app_id),
                ("client_secret", &self.config.app_secret),
                ("fb_exchange_token", short_lived_token),
            ],
        );
        let response = self.http.get(&url).await?;
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

    /// Read name/id/email from `/me`, then the sized picture URL from
    /// `/me/picture`.
    #[tracing::instrument(skip(self, access_token))]
    pub async fn fetch_profile(&self, access_token: &str) -> Result<ProfileData, ProfileError> {
        let me_url = with_query(
            &format!("{}/{}/me", self.config.graph_base, GRAPH_VERSION),
            &[
                ("access_token", access_token),
                ("fields", "name,id,email"),
            ],
        );
        let response = self.http.get(&me_url).await?;
        if !response.status.is_success() {
            return Err(ProfileError::Http {
                status: response.status,
                context: response.context(),
            });
        }
        let me: MeResponse = serde_json::from_slice(&response.body)
            .map_err(|e| ProfileError::InvalidJson(e.to_string()))?;
        let email = me.email.ok_or(ProfileError::MissingEmail)?;

        let picture_url = with_query(
            &format!("{}/{}/me/picture", self.config.graph_base, GRAPH_VERSION),
            &[
                ("access_token", access_token),
                ("redirect", "0"),
                ("height", "200"),
                ("width", "200"),
            ],
        );
        let response = self.http.get(&picture_url).await?;
        if !response.status.is_success() {
            return Err(ProfileError::Http {
                status: response.status,
                context: response.context(),
            });
        }
        let picture: PictureResponse = serde_json::from_slice(&response.body)
            .map_err(|e| ProfileError::InvalidJson(e.to_string()))?;

        Ok(ProfileData {
            subject_id: me.id,
            name: me.name.unwrap_or_default(),
            email,
            picture_url: Some(picture.data.url),
        })
    }

    /// Delete the app permission grant, invalidating the token. The subject
    /// id addresses the grant being removed.
    #[tracing::instrument(skip(self, access_token))]
    pub async fn revoke(&self, subject_id: &str, access_token: &str) -> Result<(), RevokeError> {
        let url = with_query(
            &format!("{}/{}/permissions", self.config.graph_base, subject_id),
            &[("access_token", access_token)],
        );
        let response = self.http.delete(&url).await?;
        if !response.status.is_success() {
            return Err(RevokeError::Http {
                status: response.status,
                context: response.context(),
            });
        }
        Ok(())
    }
}
