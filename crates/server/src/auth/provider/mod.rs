//! Clients for the supported identity providers.
//!
//! Each provider implements the same capability set - exchange an
//! authorization grant for an access token, fetch profile data, revoke a
//! token - against its own endpoints and credential format. Dispatch happens
//! here, on the [`Provider`] tag, so no call site branches on provider
//! strings.

mod facebook;
mod google;
mod http;

pub use http::ProviderHttp;

use crate::config::AppConfig;
use crate::error::{ExchangeError, ProfileError, RevokeError};
use facebook::FacebookProvider;
use google::GoogleProvider;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Supported third-party identity providers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Facebook,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Facebook => "facebook",
        }
    }
}

/// Profile data returned by a successful exchange + fetch. Consumed once by
/// the identity resolver and discarded.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileData {
    /// Provider-scoped subject id; not comparable across providers.
    pub subject_id: String,
    pub name: String,
    pub email: String,
    pub picture_url: Option<String>,
}

/// Opaque credential blob kept in the session while authenticated; the
/// subject id is needed for Facebook's revocation endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderCredentials {
    pub access_token: String,
    pub subject_id: String,
}

/// Client over all configured providers, dispatching by [`Provider`] tag.
#[derive(Clone)]
pub struct ProviderClient {
    google: GoogleProvider,
    facebook: FacebookProvider,
}

impl ProviderClient {
    pub fn new(config: &AppConfig) -> Self {
        let http = ProviderHttp::new(Duration::from_secs(config.provider_timeout_secs));
        Self {
            google: GoogleProvider::new(http.clone(), config.google.clone()),
            facebook: FacebookProvider::new(http, config.facebook.clone()),
        }
    }

    /// Exchange the authorization grant delivered by the provider redirect
    /// for an access token. For Google the grant is an authorization code;
    /// for Facebook it is a short-lived client token exchanged for a
    /// long-lived one.
    pub async fn exchange(&self, provider: Provider, grant: &str) -> Result<String, ExchangeError> {
        match provider {
            Provider::Google => self.google.exchange(grant).await,
            Provider::Facebook => self.facebook.exchange(grant).await,
        }
    }

    /// Fetch name, email, picture and subject id for the token's user.
    pub async fn fetch_profile(
        &self,
        provider: Provider,
        access_token: &str,
    ) -> Result<ProfileData, ProfileError> {
        match provider {
            Provider::Google => self.google.fetch_profile(access_token).await,
            Provider::Facebook => self.facebook.fetch_profile(access_token).await,
        }
    }

    /// Best-effort upstream revocation. The caller treats failure as
    /// advisory; nothing here is fatal to a logout.
    pub async fn revoke(
        &self,
        provider: Provider,
        credentials: &ProviderCredentials,
    ) -> Result<(), RevokeError> {
        match provider {
            Provider::Google => self.google.revoke(&credentials.access_token).await,
            Provider::Facebook => {
                self.facebook
                    .revoke(&credentials.subject_id, &credentials.access_token)
                    .await
            }
        }
    }
}
