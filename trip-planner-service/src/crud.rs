//! Item and user endpoints over the injected stores.

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use tracing::{info, warn};

use crate::{
    models::{
        Item, ItemCreate, ItemUpdate, MessageResponse, Pagination, User, UserCreate, UserUpdate,
    },
    service::{ApiResult, AppState, JsonBody, planner_error},
};

pub async fn list_items(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> ApiResult<Vec<Item>> {
    state.items.list(page).await.map(Json).map_err(planner_error)
}

pub async fn get_item(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult<Item> {
    state.items.get(id).await.map(Json).map_err(planner_error)
}

pub async fn create_item(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ItemCreate>,
) -> ApiResult<Item> {
    let item = state.items.create(request).await.map_err(planner_error)?;
    info!(item_id = item.id, name = %item.name, "Item created");
    Ok(Json(item))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    JsonBody(request): JsonBody<ItemUpdate>,
) -> ApiResult<Item> {
    state
        .items
        .update(id, request)
        .await
        .map(Json)
        .map_err(planner_error)
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<MessageResponse> {
    let item = state.items.delete(id).await.map_err(planner_error)?;
    info!(item_id = id, "Item deleted");
    Ok(Json(MessageResponse {
        message: format!("Item '{}' deleted successfully", item.name),
    }))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> ApiResult<Vec<User>> {
    state.users.list(page).await.map(Json).map_err(planner_error)
}

pub async fn get_user(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult<User> {
    state.users.get(id).await.map(Json).map_err(planner_error)
}

pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<UserCreate>,
) -> ApiResult<User> {
    let email = request.email.clone();
    match state.users.create(request).await {
        Ok(user) => {
            info!(user_id = user.id, "User created");
            Ok(Json(user))
        }
        Err(e) => {
            warn!(email = %email, error = %e, "Failed to create user");
            Err(planner_error(e))
        }
    }
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    JsonBody(request): JsonBody<UserUpdate>,
) -> ApiResult<User> {
    state
        .users
        .update(id, request)
        .await
        .map(Json)
        .map_err(planner_error)
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<MessageResponse> {
    let user = state.users.delete(id).await.map_err(planner_error)?;
    info!(user_id = id, "User deleted");
    Ok(Json(MessageResponse {
        message: format!("User '{}' deleted successfully", user.name),
    }))
}
