//! API module providing the HTTP surface of the application.
//!
//! This module is organized into submodules:
//! - `auth` - Login, provider callback and disconnect endpoints (/auth/*)
//! - `restaurants` - Restaurant CRUD and export (/api/restaurants)
//! - `menu` - Menu item CRUD and export (/api/restaurants/{id}/menu)
//! - `health` - Health check endpoint (/healthz)
//! - `openapi` - OpenAPI/Utoipa configuration

pub mod auth;
pub mod health;
pub mod menu;
pub mod openapi;
pub mod restaurants;

pub use auth::AUTH_TAG;
pub use health::MISC_TAG;
pub use menu::MENU_TAG;
pub use restaurants::RESTAURANTS_TAG;

use crate::AppResources;
use axum::Extension;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_redoc::{Redoc, Servable};

/// Build the complete application router with middleware attached.
///
/// Shared with the integration tests, which drive this router directly
/// instead of binding a socket.
pub fn app_router(resources: AppResources) -> axum::Router {
    let (router, api) = OpenApiRouter::with_openapi(openapi::ApiDoc::openapi())
        .nest("/auth", auth::router())
        .nest(
            "/api/restaurants",
            restaurants::router().merge(menu::router()),
        )
        .routes(routes!(health::health))
        .layer(Extension(resources))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .split_for_parts();

    router.merge(Redoc::with_url("/api-docs", api))
}

/// Starts the web server with all configured routes.
#[tracing::instrument(skip(resources))]
pub async fn start_webserver(resources: AppResources) -> color_eyre::Result<()> {
    let listen_addr = resources.config.listen_addr.clone();
    let router = app_router(resources);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(addr = %listen_addr, "Server running");
    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|e| color_eyre::Report::msg(format!("Failed to start server: {e}")))?;

    Ok(())
}
