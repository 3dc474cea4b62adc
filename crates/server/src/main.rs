use menu_manager::AppResources;
use menu_manager::api::start_webserver;
use menu_manager::auth::provider::ProviderClient;
use menu_manager::auth::session::SessionStore;
use menu_manager::config::load_config_or_panic;
use rustls::crypto;
use rustls::crypto::CryptoProvider;
use sea_orm::Database;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn initialize_tracing() {
    let default_directives = "menu_manager=info,hyper=warn,sea_orm=info";
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let registry = tracing_subscriber::registry().with(env_filter);
    let layer = fmt::layer().with_target(true).with_level(true);

    registry.with(layer).init();
}

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install().expect("Failed to install `color_eyre::install`");

    initialize_tracing();

    // Local development convenience; real deployments set the environment.
    dotenvy::dotenv().ok();

    // Load config
    let config = Arc::new(load_config_or_panic());

    let ring_provider = crypto::ring::default_provider();
    CryptoProvider::install_default(ring_provider).expect("Failed to install crypto provider");

    // Set up SeaORM database connection
    let db = Arc::new(
        Database::connect(&config.database_url)
            .await
            .expect("Failed to connect to database"),
    );

    let providers = ProviderClient::new(&config);
    let sessions = SessionStore::new();

    let resources = AppResources {
        db,
        sessions,
        providers,
        config,
    };

    start_webserver(resources).await?;
    Ok(())
}
