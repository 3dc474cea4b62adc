use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration build error: {0}")]
    Build(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Credentials and endpoints for the Google sign-in integration.
///
/// The endpoint fields default to the production Google URLs; tests point
/// them at a local mock server instead.
#[derive(Clone, Debug, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_google_token_endpoint")]
    pub token_endpoint: String,
    #[serde(default = "default_google_tokeninfo_endpoint")]
    pub tokeninfo_endpoint: String,
    #[serde(default = "default_google_userinfo_endpoint")]
    pub userinfo_endpoint: String,
    #[serde(default = "default_google_revoke_endpoint")]
    pub revoke_endpoint: String,
}

/// Credentials and the Graph API base URL for the Facebook integration.
#[derive(Clone, Debug, Deserialize)]
pub struct FacebookConfig {
    pub app_id: String,
    pub app_secret: String,
    #[serde(default = "default_facebook_graph_base")]
    pub graph_base: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_cookie")]
    pub cookie_name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    pub frontend_url: String,
    #[serde(default = "default_session_config")]
    pub session: SessionConfig,
    pub google: GoogleConfig,
    pub facebook: FacebookConfig,
    /// Upper bound, in seconds, for any single network call to an identity
    /// provider. A call exceeding it is reported as the failing stage's
    /// error kind rather than hanging the request.
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,
}

fn default_google_token_endpoint() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_google_tokeninfo_endpoint() -> String {
    "https://www.googleapis.com/oauth2/v1/tokeninfo".to_string()
}

fn default_google_userinfo_endpoint() -> String {
    "https://www.googleapis.com/oauth2/v1/userinfo".to_string()
}

fn default_google_revoke_endpoint() -> String {
    "https://accounts.google.com/o/oauth2/revoke".to_string()
}

fn default_facebook_graph_base() -> String {
    "https://graph.facebook.com".to_string()
}

fn default_session_cookie() -> String {
    "menu_session".to_string()
}

fn default_session_config() -> SessionConfig {
    SessionConfig {
        cookie_name: default_session_cookie(),
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_provider_timeout_secs() -> u64 {
    10
}

/// Load application configuration from `config.yaml` + environment overrides.
///
/// Environment variable override convention: any var matching the key path
/// separated by double underscores (e.g. `GOOGLE__CLIENT_ID`) overrides the
/// file value.
///
/// Returns a `ConfigError` instead of panicking so the caller can decide how to fail.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    use config::{Config, Environment, File};
    let cfg = Config::builder()
        .add_source(File::with_name("config.yaml"))
        .add_source(Environment::default().separator("__"))
        .build()?;

    let app: AppConfig = cfg.try_deserialize()?;
    validate(&app)?;
    Ok(app)
}

fn validate(app: &AppConfig) -> Result<(), ConfigError> {
    if app.google.client_id.is_empty() || app.google.client_secret.is_empty() {
        return Err(ConfigError::Validation(
            "google.client_id and google.client_secret must be set".into(),
        ));
    }
    if app.facebook.app_id.is_empty() || app.facebook.app_secret.is_empty() {
        return Err(ConfigError::Validation(
            "facebook.app_id and facebook.app_secret must be set".into(),
        ));
    }
    if app.provider_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "provider_timeout_secs must be > 0".into(),
        ));
    }
    if app.session.cookie_name.is_empty() {
        return Err(ConfigError::Validation(
            "session.cookie_name must not be empty".into(),
        ));
    }
    Ok(())
}

/// Convenience helper for binaries wanting panic-on-error behaviour.
pub fn load_config_or_panic() -> AppConfig {
    match load_config() {
        Ok(c) => c,
        Err(e) => panic!("Failed to load configuration: {e}"),
    }
}
