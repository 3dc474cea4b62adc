//! Menu management web application.
//!
//! Restaurants and their menus are owned per-user; users sign in through
//! third-party identity providers (Google, Facebook) and every mutation is
//! gated on resource ownership.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::auth::provider::ProviderClient;
use crate::auth::session::SessionStore;
use crate::config::AppConfig;

pub mod api;
pub mod auth;
pub mod config;
pub mod entity;
pub mod error;
pub mod response;

/// Shared handles every request handler can reach through the router's
/// extension layer.
#[derive(Clone)]
pub struct AppResources {
    pub db: Arc<DatabaseConnection>,
    pub sessions: SessionStore,
    pub providers: ProviderClient,
    pub config: Arc<AppConfig>,
}
