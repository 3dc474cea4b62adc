//! Restaurant listing and mutation endpoints.
//!
//! Listing is public and doubles as the machine-readable export. Every
//! mutation is gated on ownership through `require_owner` before any
//! persisted state is touched.

use crate::AppResources;
use crate::api::auth::ClientSession;
use crate::auth::guard::require_owner;
use crate::entity::{identity, menu_item, restaurant};
use crate::response::ApiMessage;
use axum::{Extension, Json};
use axum::extract::Path;
use axum::response::{IntoResponse, Response};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// OpenAPI tag for restaurant endpoints.
pub const RESTAURANTS_TAG: &str = "Restaurants";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RestaurantPayload {
    pub id: i32,
    pub name: String,
    /// Display name of the owning identity.
    pub owner: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RestaurantList {
    pub restaurants: Vec<RestaurantPayload>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RestaurantName {
    pub name: String,
}

/// Creates the restaurants router.
pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_restaurants, create_restaurant))
        .routes(routes!(rename_restaurant, delete_restaurant))
}

/// Public listing of all restaurants with their owners' display names.
#[utoipa::path(
    get,
    path = "/",
    tag = RESTAURANTS_TAG,
    operation_id = "List Restaurants",
    summary = "List all restaurants",
    responses(
        (status = 200, description = "All restaurants", body = RestaurantList),
    )
)]
#[tracing::instrument(skip_all)]
async fn list_restaurants(
    Extension(resources): Extension<AppResources>,
) -> Response {
    let rows = match restaurant::Entity::find()
        .find_also_related(identity::Entity)
        .all(resources.db.as_ref())
        .await
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "Failed to list restaurants");
            return ApiMessage::server_error().into_response();
        }
    };

    let restaurants = rows
        .into_iter()
        .map(|(r, owner)| RestaurantPayload {
            id: r.id,
            name: r.name,
            owner: owner.map(|o| o.name).unwrap_or_default(),
        })
        .collect();
    Json(RestaurantList { restaurants }).into_response()
}

/// Create a restaurant owned by the logged-in identity.
#[utoipa::path(
    post,
    path = "/",
    tag = RESTAURANTS_TAG,
    operation_id = "Create Restaurant",
    summary = "Create a restaurant",
    request_body = RestaurantName,
    responses(
        (status = 201, description = "Created", body = RestaurantPayload),
        (status = 401, description = "Not logged in", body = crate::response::MessageBody),
    )
)]
#[tracing::instrument(skip_all)]
async fn create_restaurant(
    Extension(resources): Extension<AppResources>,
    client: ClientSession,
    Json(body): Json<RestaurantName>,
) -> Response {
    // Creation has no existing resource to own; being logged in is the gate.
    let Some(identity_id) = client.session.identity_id else {
        return ApiMessage::unauthorized("Login required").into_response();
    };
    let name = body.name.trim();
    if name.is_empty() {
        return ApiMessage::bad_request("Restaurant name must not be empty").into_response();
    }

    let model = restaurant::ActiveModel {
        name: Set(name.to_string()),
        owner_id: Set(identity_id),
        ..Default::default()
    };
    match model.insert(resources.db.as_ref()).await {
        Ok(created) => (
            axum::http::StatusCode::CREATED,
            Json(RestaurantPayload {
                id: created.id,
                name: created.name,
                owner: client.session.display_name.unwrap_or_default(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to create restaurant");
            ApiMessage::server_error().into_response()
        }
    }
}

/// Rename a restaurant. Owner only.
#[utoipa::path(
    put,
    path = "/{restaurant_id}",
    tag = RESTAURANTS_TAG,
    operation_id = "Rename Restaurant",
    summary = "Rename a restaurant",
    params(("restaurant_id" = i32, Path, description = "Restaurant to rename")),
    request_body = RestaurantName,
    responses(
        (status = 200, description = "Renamed", body = RestaurantPayload),
        (status = 403, description = "Not the owner", body = crate::response::MessageBody),
        (status = 404, description = "No such restaurant", body = crate::response::MessageBody),
    )
)]
#[tracing::instrument(skip_all, fields(restaurant_id))]
async fn rename_restaurant(
    Extension(resources): Extension<AppResources>,
    client: ClientSession,
    Path(restaurant_id): Path<i32>,
    Json(body): Json<RestaurantName>,
) -> Response {
    let existing = match restaurant::Entity::find_by_id(restaurant_id)
        .one(resources.db.as_ref())
        .await
    {
        Ok(Some(r)) => r,
        Ok(None) => return ApiMessage::not_found("No such restaurant").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load restaurant");
            return ApiMessage::server_error().into_response();
        }
    };
    if !require_owner(&client.session, existing.owner_id) {
        return ApiMessage::not_authorized().into_response();
    }
    let name = body.name.trim();
    if name.is_empty() {
        return ApiMessage::bad_request("Restaurant name must not be empty").into_response();
    }

    let mut active = existing.into_active_model();
    active.name = Set(name.to_string());
    match active.update(resources.db.as_ref()).await {
        Ok(updated) => Json(RestaurantPayload {
            id: updated.id,
            name: updated.name,
            owner: client.session.display_name.unwrap_or_default(),
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to rename restaurant");
            ApiMessage::server_error().into_response()
        }
    }
}

/// Delete a restaurant and its menu items. Owner only.
#[utoipa::path(
    delete,
    path = "/{restaurant_id}",
    tag = RESTAURANTS_TAG,
    operation_id = "Delete Restaurant",
    summary = "Delete a restaurant",
    params(("restaurant_id" = i32, Path, description = "Restaurant to delete")),
    responses(
        (status = 200, description = "Deleted", body = crate::response::MessageBody),
        (status = 403, description = "Not the owner", body = crate::response::MessageBody),
        (status = 404, description = "No such restaurant", body = crate::response::MessageBody),
    )
)]
#[tracing::instrument(skip_all, fields(restaurant_id))]
async fn delete_restaurant(
    Extension(resources): Extension<AppResources>,
    client: ClientSession,
    Path(restaurant_id): Path<i32>,
) -> Response {
    let existing = match restaurant::Entity::find_by_id(restaurant_id)
        .one(resources.db.as_ref())
        .await
    {
        Ok(Some(r)) => r,
        Ok(None) => return ApiMessage::not_found("No such restaurant").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load restaurant");
            return ApiMessage::server_error().into_response();
        }
    };
    if !require_owner(&client.session, existing.owner_id) {
        return ApiMessage::not_authorized().into_response();
    }

    // Menu items go with their restaurant.
    let cascade = menu_item::Entity::delete_many()
        .filter(menu_item::Column::RestaurantId.eq(restaurant_id))
        .exec(resources.db.as_ref())
        .await;
    if let Err(e) = cascade {
        tracing::error!(error = %e, "Failed to delete menu items for restaurant");
        return ApiMessage::server_error().into_response();
    }

    match restaurant::Entity::delete_by_id(restaurant_id)
        .exec(resources.db.as_ref())
        .await
    {
        Ok(_) => ApiMessage::ok("Restaurant deleted").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete restaurant");
            ApiMessage::server_error().into_response()
        }
    }
}
