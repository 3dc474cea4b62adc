//! Per-browser session state.
//!
//! A [`Session`] is a plain value: handlers load it from the store, operate
//! on it, and save it back. The lifecycle stage is derived from the fields
//! rather than stored, so `identity_id` being set and the session being
//! `Authenticated` cannot drift apart.

use crate::auth::provider::Provider;
use crate::auth::state_token;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Lifecycle stage of a session.
///
/// Anonymous -> PendingAuth (state token issued) -> Authenticated ->
/// Anonymous again on disconnect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthStage {
    Anonymous,
    PendingAuth,
    Authenticated,
}

/// Everything this application keeps about one browser client.
///
/// `provider_credentials` is an opaque blob owned by the login flow; the
/// session layer stores and clears it but never interprets it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Session {
    pub state_token: Option<String>,
    pub provider: Option<Provider>,
    pub identity_id: Option<i32>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub picture_url: Option<String>,
    pub provider_credentials: Option<String>,
}

impl Session {
    /// Derive the lifecycle stage. An identity always means Authenticated,
    /// even when a fresh state token was issued on top (re-login attempt).
    pub fn stage(&self) -> AuthStage {
        if self.identity_id.is_some() {
            AuthStage::Authenticated
        } else if self.state_token.is_some() {
            AuthStage::PendingAuth
        } else {
            AuthStage::Anonymous
        }
    }

    /// Issue a fresh anti-forgery token for a login attempt and remember it.
    ///
    /// Re-issuing replaces any previous token, so an abandoned login attempt
    /// is invalidated by the next one.
    pub fn begin_login(&mut self) -> String {
        let token = state_token::issue();
        self.state_token = Some(token.clone());
        token
    }

    /// Transition to Authenticated: record the resolved identity, the
    /// provider used, the display profile, and the provider credentials.
    /// Consumes the state token, making it single-use.
    pub fn establish(
        &mut self,
        provider: Provider,
        identity_id: i32,
        display_name: String,
        email: String,
        picture_url: Option<String>,
        provider_credentials: String,
    ) {
        self.state_token = None;
        self.provider = Some(provider);
        self.identity_id = Some(identity_id);
        self.display_name = Some(display_name);
        self.email = Some(email);
        self.picture_url = picture_url;
        self.provider_credentials = Some(provider_credentials);
    }

    /// Unconditionally drop every authenticated field, returning the session
    /// to Anonymous. Safe to call in any stage.
    pub fn clear_authentication(&mut self) {
        self.state_token = None;
        self.provider = None;
        self.identity_id = None;
        self.display_name = None;
        self.email = None;
        self.picture_url = None;
        self.provider_credentials = None;
    }
}

/// In-process session store, keyed by the opaque id carried in the session
/// cookie.
///
/// One logical browser client maps to one entry; a single-instance
/// deployment sees at most one in-flight request per session. Scaling
/// across processes requires replacing this with a shared store.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<DashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new anonymous session and return its id.
    pub fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.insert(id, Session::default());
        id
    }

    /// Fetch a snapshot of the session, if it exists.
    pub fn load(&self, id: &Uuid) -> Option<Session> {
        self.inner.get(id).map(|entry| entry.value().clone())
    }

    /// Write the session back under its id.
    pub fn save(&self, id: Uuid, session: Session) {
        self.inner.insert(id, session);
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.inner.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticated_session() -> Session {
        let mut session = Session::default();
        session.begin_login();
        session.establish(
            Provider::Google,
            7,
            "Ada".to_string(),
            "ada@example.com".to_string(),
            Some("https://example.com/ada.png".to_string()),
            "{\"access_token\":\"t\"}".to_string(),
        );
        session
    }

    #[test]
    fn fresh_session_is_anonymous() {
        assert_eq!(Session::default().stage(), AuthStage::Anonymous);
    }

    #[test]
    fn begin_login_moves_to_pending() {
        let mut session = Session::default();
        let token = session.begin_login();
        assert_eq!(session.stage(), AuthStage::PendingAuth);
        assert_eq!(session.state_token.as_deref(), Some(token.as_str()));
    }

    #[test]
    fn reissue_replaces_previous_token() {
        let mut session = Session::default();
        let first = session.begin_login();
        let second = session.begin_login();
        assert_ne!(first, second);
        assert_eq!(session.state_token.as_deref(), Some(second.as_str()));
    }

    #[test]
    fn establish_sets_identity_and_consumes_token() {
        let session = authenticated_session();
        assert_eq!(session.stage(), AuthStage::Authenticated);
        assert_eq!(session.identity_id, Some(7));
        assert!(session.state_token.is_none());
        assert!(session.provider_credentials.is_some());
    }

    #[test]
    fn identity_dominates_stage_even_with_fresh_token() {
        let mut session = authenticated_session();
        session.begin_login();
        assert_eq!(session.stage(), AuthStage::Authenticated);
    }

    #[test]
    fn clear_authentication_returns_to_anonymous() {
        let mut session = authenticated_session();
        session.clear_authentication();
        assert_eq!(session.stage(), AuthStage::Anonymous);
        assert!(session.identity_id.is_none());
        assert!(session.provider.is_none());
        assert!(session.display_name.is_none());
        assert!(session.email.is_none());
        assert!(session.picture_url.is_none());
        assert!(session.provider_credentials.is_none());

        // Idempotent: clearing an anonymous session is a no-op.
        session.clear_authentication();
        assert_eq!(session.stage(), AuthStage::Anonymous);
    }

    #[test]
    fn store_round_trip() {
        let store = SessionStore::new();
        let id = store.create();
        assert!(store.contains(&id));

        let mut session = store.load(&id).unwrap();
        session.begin_login();
        store.save(id, session);

        assert_eq!(store.load(&id).unwrap().stage(), AuthStage::PendingAuth);
        assert!(store.load(&Uuid::new_v4()).is_none());
    }
}
