//! OpenAPI/Utoipa configuration.

use crate::api::{auth::AUTH_TAG, health::MISC_TAG, menu::MENU_TAG, restaurants::RESTAURANTS_TAG};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Security addon for OpenAPI documentation.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            // The session cookie established via /auth/login.
            components.add_security_scheme(
                "SessionCookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("menu_session"))),
            );
        }
    }
}

/// OpenAPI documentation configuration.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Menu Manager API",
        version = "1.0.0",
        description = "Menu management API with third-party sign-in and per-user ownership."
    ),
    tags(
        (name = MISC_TAG, description = "Miscellaneous endpoints"),
        (name = AUTH_TAG, description = "Login, callback and disconnect endpoints"),
        (name = RESTAURANTS_TAG, description = "Restaurant endpoints"),
        (name = MENU_TAG, description = "Menu item endpoints")
    )
)]
pub struct ApiDoc;
