//! Login, provider callback and disconnect endpoints, plus the session
//! cookie extractor used by every route that needs the caller's session.

use crate::AppResources;
use crate::auth::flow;
use crate::auth::identity::{DbIdentityStore, IdentityResolver};
use crate::auth::provider::Provider;
use crate::auth::session::Session;
use crate::response::ApiMessage;
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;

/// OpenAPI tag for authentication endpoints.
pub const AUTH_TAG: &str = "Authentication";

/// The caller's session, loaded from the cookie-carried id.
///
/// A request without a usable cookie gets a fresh anonymous session; the
/// handler is responsible for setting the cookie when it matters (the
/// login page does).
pub struct ClientSession {
    pub id: Uuid,
    pub session: Session,
}

impl<S> FromRequestParts<S> for ClientSession
where
    S: Send + Sync,
{
    type Rejection = ApiMessage;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let resources = parts
            .extensions
            .get::<AppResources>()
            .cloned()
            .ok_or_else(|| {
                tracing::error!("AppResources not found in extensions");
                ApiMessage::server_error()
            })?;

        let jar = CookieJar::from_headers(&parts.headers);
        if let Some(cookie) = jar.get(&resources.config.session.cookie_name)
            && let Ok(id) = Uuid::parse_str(cookie.value())
            && let Some(session) = resources.sessions.load(&id)
        {
            return Ok(ClientSession { id, session });
        }

        let id = resources.sessions.create();
        Ok(ClientSession {
            id,
            session: Session::default(),
        })
    }
}

fn session_cookie(name: &str, id: Uuid) -> Cookie<'static> {
    Cookie::build((name.to_string(), id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// State token for the client to echo through the provider redirect.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginState {
    pub state: String,
}

/// Profile summary returned after a successful login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WelcomePayload {
    pub display_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CallbackQuery {
    /// Must equal the state token issued for this session.
    pub state: Option<String>,
}

/// Creates the authentication router.
pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(login))
        .routes(routes!(gconnect))
        .routes(routes!(fbconnect))
        .routes(routes!(disconnect))
}

/// Begin a login attempt.
#[utoipa::path(
    get,
    path = "/login",
    tag = AUTH_TAG,
    operation_id = "Login Initiation",
    summary = "Issue an anti-forgery state token",
    description = "Creates (or reuses) the caller's session and issues a fresh state token \
                   to embed in the provider sign-in flow. The token is single-use and must be \
                   echoed back unchanged on the callback.",
    responses(
        (status = 200, description = "State token issued", body = LoginState),
    )
)]
#[tracing::instrument(skip_all)]
async fn login(
    Extension(resources): Extension<AppResources>,
    client: ClientSession,
    jar: CookieJar,
) -> Response {
    let ClientSession { id, mut session } = client;
    let state = session.begin_login();
    resources.sessions.save(id, session);

    let jar = jar.add(session_cookie(&resources.config.session.cookie_name, id));
    (jar, Json(LoginState { state })).into_response()
}

/// Google callback: body carries the authorization code.
#[utoipa::path(
    post,
    path = "/gconnect",
    tag = AUTH_TAG,
    operation_id = "Google Connect",
    summary = "Complete a Google login",
    description = "Validates the echoed state token, exchanges the authorization code, fetches \
                   the Google profile and binds the session to the resolved local identity.",
    params(CallbackQuery),
    request_body(content = String, content_type = "text/plain", description = "Authorization code"),
    responses(
        (status = 200, description = "Logged in", body = WelcomePayload),
        (status = 401, description = "State, exchange or profile failure", body = crate::response::MessageBody),
    )
)]
#[tracing::instrument(skip_all)]
async fn gconnect(
    Extension(resources): Extension<AppResources>,
    client: ClientSession,
    Query(query): Query<CallbackQuery>,
    body: String,
) -> Response {
    connect(resources, client, Provider::Google, query, body).await
}

/// Facebook callback: body carries the short-lived access token.
#[utoipa::path(
    post,
    path = "/fbconnect",
    tag = AUTH_TAG,
    operation_id = "Facebook Connect",
    summary = "Complete a Facebook login",
    description = "Validates the echoed state token, exchanges the short-lived token for a \
                   long-lived one, fetches the Facebook profile and binds the session to the \
                   resolved local identity.",
    params(CallbackQuery),
    request_body(content = String, content_type = "text/plain", description = "Short-lived access token"),
    responses(
        (status = 200, description = "Logged in", body = WelcomePayload),
        (status = 401, description = "State, exchange or profile failure", body = crate::response::MessageBody),
    )
)]
#[tracing::instrument(skip_all)]
async fn fbconnect(
    Extension(resources): Extension<AppResources>,
    client: ClientSession,
    Query(query): Query<CallbackQuery>,
    body: String,
) -> Response {
    connect(resources, client, Provider::Facebook, query, body).await
}

async fn connect(
    resources: AppResources,
    client: ClientSession,
    provider: Provider,
    query: CallbackQuery,
    grant: String,
) -> Response {
    let ClientSession { id, mut session } = client;
    let received_state = query.state.unwrap_or_default();
    let resolver = IdentityResolver::new(DbIdentityStore::new(resources.db.clone()));

    let result = flow::complete_login(
        &mut session,
        &resources.providers,
        &resolver,
        provider,
        &received_state,
        grant.trim(),
    )
    .await;
    resources.sessions.save(id, session);

    match result {
        Ok(outcome) => Json(WelcomePayload {
            display_name: outcome.display_name,
            email: outcome.email,
            picture_url: outcome.picture_url,
        })
        .into_response(),
        Err(error) => ApiMessage::from(error).into_response(),
    }
}

/// Log out, revoking the provider token best-effort.
#[utoipa::path(
    post,
    path = "/disconnect",
    tag = AUTH_TAG,
    operation_id = "Disconnect",
    summary = "Log the current session out",
    description = "Attempts to revoke the stored provider token, then clears the session \
                   unconditionally. Reports whether anyone was logged in to begin with.",
    responses(
        (status = 200, description = "Disconnected", body = crate::response::MessageBody),
        (status = 400, description = "No user was connected", body = crate::response::MessageBody),
    )
)]
#[tracing::instrument(skip_all)]
async fn disconnect(
    Extension(resources): Extension<AppResources>,
    client: ClientSession,
) -> Response {
    let ClientSession { id, mut session } = client;

    let result = flow::disconnect(&mut session, &resources.providers).await;
    resources.sessions.save(id, session);

    match result {
        Ok(()) => ApiMessage::ok("Successfully disconnected").into_response(),
        Err(error) => ApiMessage::from(error).into_response(),
    }
}
