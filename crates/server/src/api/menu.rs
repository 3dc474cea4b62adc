//! Menu item endpoints, nested under their restaurant.
//!
//! Reads are public; creating an item requires owning the restaurant, and
//! editing or deleting one requires owning the item.

use crate::AppResources;
use crate::api::auth::ClientSession;
use crate::auth::guard::require_owner;
use crate::entity::{menu_item, restaurant};
use crate::response::ApiMessage;
use axum::{Extension, Json};
use axum::extract::Path;
use axum::response::{IntoResponse, Response};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// OpenAPI tag for menu endpoints.
pub const MENU_TAG: &str = "Menu";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MenuItemPayload {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<String>,
    pub course: Option<String>,
}

impl From<menu_item::Model> for MenuItemPayload {
    fn from(model: menu_item::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            course: model.course,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MenuList {
    pub menu_items: Vec<MenuItemPayload>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewMenuItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
}

/// All fields optional; only the provided ones change.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MenuItemUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
}

/// Creates the menu router, nested under the restaurants prefix.
pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_menu, create_menu_item))
        .routes(routes!(get_menu_item, update_menu_item, delete_menu_item))
}

async fn load_restaurant(
    db: &DatabaseConnection,
    restaurant_id: i32,
) -> Result<Option<restaurant::Model>, ApiMessage> {
    restaurant::Entity::find_by_id(restaurant_id)
        .one(db)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to load restaurant");
            ApiMessage::server_error()
        })
}

/// Load a menu item, checking it belongs to the restaurant in the path.
async fn load_menu_item(
    db: &DatabaseConnection,
    restaurant_id: i32,
    item_id: i32,
) -> Result<Option<menu_item::Model>, ApiMessage> {
    let item = menu_item::Entity::find_by_id(item_id)
        .one(db)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to load menu item");
            ApiMessage::server_error()
        })?;
    Ok(item.filter(|i| i.restaurant_id == restaurant_id))
}

/// Public menu listing for one restaurant.
#[utoipa::path(
    get,
    path = "/{restaurant_id}/menu",
    tag = MENU_TAG,
    operation_id = "List Menu",
    summary = "List a restaurant's menu",
    params(("restaurant_id" = i32, Path, description = "Restaurant whose menu to list")),
    responses(
        (status = 200, description = "Menu items", body = MenuList),
        (status = 404, description = "No such restaurant", body = crate::response::MessageBody),
    )
)]
#[tracing::instrument(skip_all, fields(restaurant_id))]
async fn list_menu(
    Extension(resources): Extension<AppResources>,
    Path(restaurant_id): Path<i32>,
) -> Response {
    match load_restaurant(resources.db.as_ref(), restaurant_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return ApiMessage::not_found("No such restaurant").into_response(),
        Err(failure) => return failure.into_response(),
    }

    match menu_item::Entity::find()
        .filter(menu_item::Column::RestaurantId.eq(restaurant_id))
        .all(resources.db.as_ref())
        .await
    {
        Ok(items) => Json(MenuList {
            menu_items: items.into_iter().map(MenuItemPayload::from).collect(),
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list menu items");
            ApiMessage::server_error().into_response()
        }
    }
}

/// Single menu item, public.
#[utoipa::path(
    get,
    path = "/{restaurant_id}/menu/{item_id}",
    tag = MENU_TAG,
    operation_id = "Get Menu Item",
    summary = "Fetch one menu item",
    params(
        ("restaurant_id" = i32, Path, description = "Restaurant the item belongs to"),
        ("item_id" = i32, Path, description = "Menu item id"),
    ),
    responses(
        (status = 200, description = "Menu item", body = MenuItemPayload),
        (status = 404, description = "No such item", body = crate::response::MessageBody),
    )
)]
#[tracing::instrument(skip_all, fields(restaurant_id, item_id))]
async fn get_menu_item(
    Extension(resources): Extension<AppResources>,
    Path((restaurant_id, item_id)): Path<(i32, i32)>,
) -> Response {
    match load_menu_item(resources.db.as_ref(), restaurant_id, item_id).await {
        Ok(Some(item)) => Json(MenuItemPayload::from(item)).into_response(),
        Ok(None) => ApiMessage::not_found("No such menu item").into_response(),
        Err(failure) => failure.into_response(),
    }
}

/// Add a menu item. Restaurant owner only.
#[utoipa::path(
    post,
    path = "/{restaurant_id}/menu",
    tag = MENU_TAG,
    operation_id = "Create Menu Item",
    summary = "Add a menu item to a restaurant",
    params(("restaurant_id" = i32, Path, description = "Restaurant to add the item to")),
    request_body = NewMenuItem,
    responses(
        (status = 201, description = "Created", body = MenuItemPayload),
        (status = 403, description = "Not the owner", body = crate::response::MessageBody),
        (status = 404, description = "No such restaurant", body = crate::response::MessageBody),
    )
)]
#[tracing::instrument(skip_all, fields(restaurant_id))]
async fn create_menu_item(
    Extension(resources): Extension<AppResources>,
    client: ClientSession,
    Path(restaurant_id): Path<i32>,
    Json(body): Json<NewMenuItem>,
) -> Response {
    let parent = match load_restaurant(resources.db.as_ref(), restaurant_id).await {
        Ok(Some(r)) => r,
        Ok(None) => return ApiMessage::not_found("No such restaurant").into_response(),
        Err(failure) => return failure.into_response(),
    };
    if !require_owner(&client.session, parent.owner_id) {
        return ApiMessage::not_authorized().into_response();
    }
    let name = body.name.trim();
    if name.is_empty() {
        return ApiMessage::bad_request("Menu item name must not be empty").into_response();
    }

    let model = menu_item::ActiveModel {
        name: Set(name.to_string()),
        description: Set(body.description),
        price: Set(body.price),
        course: Set(body.course),
        image: Set(None),
        restaurant_id: Set(restaurant_id),
        owner_id: Set(parent.owner_id),
        ..Default::default()
    };
    match model.insert(resources.db.as_ref()).await {
        Ok(created) => (
            axum::http::StatusCode::CREATED,
            Json(MenuItemPayload::from(created)),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to create menu item");
            ApiMessage::server_error().into_response()
        }
    }
}

/// Edit a menu item. Owner only.
#[utoipa::path(
    put,
    path = "/{restaurant_id}/menu/{item_id}",
    tag = MENU_TAG,
    operation_id = "Update Menu Item",
    summary = "Edit a menu item",
    params(
        ("restaurant_id" = i32, Path, description = "Restaurant the item belongs to"),
        ("item_id" = i32, Path, description = "Menu item id"),
    ),
    request_body = MenuItemUpdate,
    responses(
        (status = 200, description = "Updated", body = MenuItemPayload),
        (status = 403, description = "Not the owner", body = crate::response::MessageBody),
        (status = 404, description = "No such item", body = crate::response::MessageBody),
    )
)]
#[tracing::instrument(skip_all, fields(restaurant_id, item_id))]
async fn update_menu_item(
    Extension(resources): Extension<AppResources>,
    client: ClientSession,
    Path((restaurant_id, item_id)): Path<(i32, i32)>,
    Json(body): Json<MenuItemUpdate>,
) -> Response {
    let existing = match load_menu_item(resources.db.as_ref(), restaurant_id, item_id).await {
        Ok(Some(item)) => item,
        Ok(None) => return ApiMessage::not_found("No such menu item").into_response(),
        Err(failure) => return failure.into_response(),
    };
    if !require_owner(&client.session, existing.owner_id) {
        return ApiMessage::not_authorized().into_response();
    }

    let mut active = existing.into_active_model();
    if let Some(name) = body.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return ApiMessage::bad_request("Menu item name must not be empty").into_response();
        }
        active.name = Set(name);
    }
    if let Some(description) = body.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = body.price {
        active.price = Set(Some(price));
    }
    if let Some(course) = body.course {
        active.course = Set(Some(course));
    }

    match active.update(resources.db.as_ref()).await {
        Ok(updated) => Json(MenuItemPayload::from(updated)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to update menu item");
            ApiMessage::server_error().into_response()
        }
    }
}

/// Delete a menu item. Owner only.
#[utoipa::path(
    delete,
    path = "/{restaurant_id}/menu/{item_id}",
    tag = MENU_TAG,
    operation_id = "Delete Menu Item",
    summary = "Delete a menu item",
    params(
        ("restaurant_id" = i32, Path, description = "Restaurant the item belongs to"),
        ("item_id" = i32, Path, description = "Menu item id"),
    ),
    responses(
        (status = 200, description = "Deleted", body = crate::response::MessageBody),
        (status = 403, description = "Not the owner", body = crate::response::MessageBody),
        (status = 404, description = "No such item", body = crate::response::MessageBody),
    )
)]
#[tracing::instrument(skip_all, fields(restaurant_id, item_id))]
async fn delete_menu_item(
    Extension(resources): Extension<AppResources>,
    client: ClientSession,
    Path((restaurant_id, item_id)): Path<(i32, i32)>,
) -> Response {
    let existing = match load_menu_item(resources.db.as_ref(), restaurant_id, item_id).await {
        Ok(Some(item)) => item,
        Ok(None) => return ApiMessage::not_found("No such menu item").into_response(),
        Err(failure) => return failure.into_response(),
    };
    if !require_owner(&client.session, existing.owner_id) {
        return ApiMessage::not_authorized().into_response();
    }

    match menu_item::Entity::delete_by_id(existing.id)
        .exec(resources.db.as_ref())
        .await
    {
        Ok(_) => ApiMessage::ok("Menu item deleted").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete menu item");
            ApiMessage::server_error().into_response()
        }
    }
}
