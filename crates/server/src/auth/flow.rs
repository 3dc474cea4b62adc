//! Login and logout orchestration.
//!
//! `complete_login` drives the callback chain: state validation, grant
//! exchange, profile fetch, identity resolution, session transition. Any
//! failure leaves the session exactly as it was - nothing is committed
//! before the final transition. `disconnect` revokes best-effort and then
//! clears unconditionally.

use crate::auth::identity::{IdentityResolver, IdentityStore};
use crate::auth::provider::{Provider, ProviderClient, ProviderCredentials};
use crate::auth::session::{AuthStage, Session};
use crate::auth::state_token;
use crate::error::AuthFlowError;

/// What a successful login hands back to the response layer.
#[derive(Clone, Debug)]
pub struct LoginOutcome {
    pub identity_id: i32,
    pub display_name: String,
    pub email: String,
    pub picture_url: Option<String>,
}

/// Drive the provider callback to an authenticated session.
///
/// On success the session is Authenticated and the state token consumed.
/// On failure the session is untouched: still PendingAuth, error surfaced
/// to the caller.
#[tracing::instrument(skip_all, fields(provider = provider.as_str()))]
pub async fn complete_login<S: IdentityStore>(
    session: &mut Session,
    providers: &ProviderClient,
    resolver: &IdentityResolver<S>,
    provider: Provider,
    received_state: &str,
    grant: &str,
) -> Result<LoginOutcome, AuthFlowError> {
    // Aborts before any provider or identity-store call.
    state_token::validate(session.state_token.as_deref(), received_state)?;

    let access_token = providers.exchange(provider, grant).await?;
    let profile = providers.fetch_profile(provider, &access_token).await?;
    let identity_id = resolver.resolve(&profile).await?;

    if session.stage() == AuthStage::Authenticated && session.identity_id == Some(identity_id) {
        return Err(AuthFlowError::AlreadyConnected);
    }

    let credentials = ProviderCredentials {
        access_token,
        subject_id: profile.subject_id.clone(),
    };
    let blob =
        serde_json::to_string(&credentials).expect("provider credentials serialize to JSON");

    session.establish(
        provider,
        identity_id,
        profile.name.clone(),
        profile.email.clone(),
        profile.picture_url.clone(),
        blob,
    );
    tracing::info!(identity_id, "Login completed");

    Ok(LoginOutcome {
        identity_id,
        display_name: profile.name,
        email: profile.email,
        picture_url: profile.picture_url,
    })
}

/// Log the session out.
///
/// Revocation of the stored provider token is attempted first but its
/// outcome never blocks the logout: the session is cleared whether the
/// upstream call succeeds, fails or times out. Disconnecting an anonymous
/// session reports `NotConnected` so the UI can say so, and changes
/// nothing.
#[tracing::instrument(skip_all)]
pub async fn disconnect(
    session: &mut Session,
    providers: &ProviderClient,
) -> Result<(), AuthFlowError> {
    if session.stage() != AuthStage::Authenticated {
        return Err(AuthFlowError::NotConnected);
    }

    if let (Some(provider), Some(blob)) = (session.provider, session.provider_credentials.as_ref())
    {
        match serde_json::from_str::<ProviderCredentials>(blob) {
            Ok(credentials) => {
                if let Err(e) = providers.revoke(provider, &credentials).await {
                    tracing::warn!(
                        provider = provider.as_str(),
                        error = %e,
                        "Token revocation failed; clearing session anyway"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stored provider credentials unreadable; skipping revocation");
            }
        }
    }

    session.clear_authentication();
    tracing::info!("Session disconnected");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::identity::DbIdentityStore;
    use crate::config::{AppConfig, FacebookConfig, GoogleConfig, SessionConfig};
    use sea_orm::{ConnectionTrait, Database, DbBackend, Statement};
    use std::sync::Arc;

    fn test_config() -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".into(),
            listen_addr: "127.0.0.1:0".into(),
            frontend_url: "http://localhost:3000".into(),
            session: SessionConfig {
                cookie_name: "menu_session".into(),
            },
            google: GoogleConfig {
                client_id: "gid".into(),
                client_secret: "gsecret".into(),
                token_endpoint: "http://127.0.0.1:9/token".into(),
                tokeninfo_endpoint: "http://127.0.0.1:9/tokeninfo".into(),
                userinfo_endpoint: "http://127.0.0.1:9/userinfo".into(),
                revoke_endpoint: "http://127.0.0.1:9/revoke".into(),
            },
            facebook: FacebookConfig {
                app_id: "fid".into(),
                app_secret: "fsecret".into(),
                graph_base: "http://127.0.0.1:9".into(),
            },
            provider_timeout_secs: 1,
        }
    }

    async fn test_resolver() -> IdentityResolver<DbIdentityStore> {
        let db = Database::connect("sqlite::memory:").await.expect("connect");
        db.execute(Statement::from_string(
            DbBackend::Sqlite,
            r#"CREATE TABLE identity (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                picture_url TEXT NULL
            );"#,
        ))
        .await
        .expect("create identity table");
        IdentityResolver::new(DbIdentityStore::new(Arc::new(db)))
    }

    fn install_crypto() {
        let _ = rustls::crypto::ring::default_provider().install_default();
    }

    #[tokio::test]
    async fn wrong_state_aborts_with_no_side_effects() {
        install_crypto();
        let providers = ProviderClient::new(&test_config());
        let resolver = test_resolver().await;

        let mut session = Session::default();
        let issued = session.begin_login();
        assert_ne!(issued, "WRONG");

        let result = complete_login(
            &mut session,
            &providers,
            &resolver,
            Provider::Google,
            "WRONG",
            "code",
        )
        .await;

        assert!(matches!(result, Err(AuthFlowError::InvalidState)));
        // Session unchanged: still pending, token still present.
        assert_eq!(session.stage(), AuthStage::PendingAuth);
        assert_eq!(session.state_token.as_deref(), Some(issued.as_str()));
    }

    #[tokio::test]
    async fn callback_without_issued_token_is_invalid_state() {
        install_crypto();
        let providers = ProviderClient::new(&test_config());
        let resolver = test_resolver().await;

        let mut session = Session::default();
        let result = complete_login(
            &mut session,
            &providers,
            &resolver,
            Provider::Facebook,
            "ANYTHING",
            "token",
        )
        .await;

        assert!(matches!(result, Err(AuthFlowError::InvalidState)));
        assert_eq!(session.stage(), AuthStage::Anonymous);
    }

    #[tokio::test]
    async fn disconnect_while_anonymous_reports_not_connected() {
        install_crypto();
        let providers = ProviderClient::new(&test_config());

        let mut session = Session::default();
        let result = disconnect(&mut session, &providers).await;
        assert!(matches!(result, Err(AuthFlowError::NotConnected)));
        assert_eq!(session.stage(), AuthStage::Anonymous);
    }

    #[tokio::test]
    async fn disconnect_clears_even_when_revoke_unreachable() {
        install_crypto();
        // Endpoints point at a closed port, so revocation fails fast.
        let providers = ProviderClient::new(&test_config());

        let mut session = Session::default();
        session.begin_login();
        session.establish(
            Provider::Google,
            7,
            "Ada".into(),
            "ada@example.com".into(),
            None,
            serde_json::to_string(&ProviderCredentials {
                access_token: "tok".into(),
                subject_id: "s".into(),
            })
            .unwrap(),
        );

        disconnect(&mut session, &providers).await.unwrap();
        assert_eq!(session.stage(), AuthStage::Anonymous);
        assert!(session.provider_credentials.is_none());
    }
}
