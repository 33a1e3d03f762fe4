//! Menu API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    MenuCategory, MenuCategoryCreate, MenuCategoryUpdate, MenuItem, MenuItemCreate, MenuItemUpdate,
};

use crate::api::{ApiResult, conflict_as, ok};
use crate::auth::CurrentUser;
use crate::db::repository::{RepoError, category, menu_item};
use crate::state::AppState;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_price, validate_required_text,
};

#[derive(Debug, Deserialize)]
pub struct ItemQuery {
    pub category_id: Option<i64>,
    #[serde(default)]
    pub available_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityUpdate {
    pub is_available: bool,
}

fn category_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::CategoryNotFound).with_detail("category_id", id)
}

fn item_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::MenuItemNotFound).with_detail("menu_item_id", id)
}

async fn ensure_category(state: &AppState, restaurant_id: i64, id: i64) -> Result<(), AppError> {
    category::find_by_id(&state.pool, restaurant_id, id)
        .await?
        .ok_or_else(|| category_not_found(id))?;
    Ok(())
}

/// GET /api/menu/categories
pub async fn list_categories(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Vec<MenuCategory>> {
    let categories = category::list(&state.pool, user.restaurant_id, false).await?;
    Ok(ok(categories))
}

/// POST /api/menu/categories
pub async fn create_category(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<MenuCategoryCreate>,
) -> ApiResult<MenuCategory> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    let created = category::create(&state.pool, user.restaurant_id, &payload)
        .await
        .map_err(conflict_as(ErrorCode::CategoryNameExists))?;
    Ok(ok(created))
}

/// PUT /api/menu/categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<MenuCategoryUpdate>,
) -> ApiResult<MenuCategory> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    let updated = category::update(&state.pool, user.restaurant_id, id, &payload)
        .await
        .map_err(conflict_as(ErrorCode::CategoryNameExists))?
        .ok_or_else(|| category_not_found(id))?;
    Ok(ok(updated))
}

/// DELETE /api/menu/categories/{id} - refused while items remain
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    let deleted = match category::delete(&state.pool, user.restaurant_id, id).await {
        Ok(deleted) => deleted,
        Err(RepoError::Validation(msg)) => {
            let err = AppError::with_message(ErrorCode::CategoryHasItems, msg);
            return Err(err.with_detail("category_id", id));
        }
        Err(e) => return Err(e.into()),
    };
    if !deleted {
        return Err(category_not_found(id));
    }
    Ok(ok(true))
}

/// GET /api/menu/items - optionally by category or available only
pub async fn list_items(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ItemQuery>,
) -> ApiResult<Vec<MenuItem>> {
    let items = menu_item::list(
        &state.pool,
        user.restaurant_id,
        query.category_id,
        query.available_only,
    )
    .await?;
    Ok(ok(items))
}

/// GET /api/menu/items/{id}
pub async fn get_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<MenuItem> {
    let item = menu_item::find_by_id(&state.pool, user.restaurant_id, id)
        .await?
        .ok_or_else(|| item_not_found(id))?;
    Ok(ok(item))
}

/// POST /api/menu/items
pub async fn create_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<MenuItemCreate>,
) -> ApiResult<MenuItem> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_price(payload.price)?;
    ensure_category(&state, user.restaurant_id, payload.category_id).await?;

    let item = menu_item::create(&state.pool, user.restaurant_id, &payload).await?;
    tracing::info!(menu_item_id = item.id, name = %item.name, "Menu item created");
    Ok(ok(item))
}

/// PUT /api/menu/items/{id} - partial update
pub async fn update_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<MenuItemUpdate>,
) -> ApiResult<MenuItem> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    if let Some(price) = payload.price {
        validate_price(price)?;
    }
    if let Some(category_id) = payload.category_id {
        ensure_category(&state, user.restaurant_id, category_id).await?;
    }

    let item = menu_item::update(&state.pool, user.restaurant_id, id, &payload)
        .await?
        .ok_or_else(|| item_not_found(id))?;
    Ok(ok(item))
}

/// PUT /api/menu/items/{id}/availability
pub async fn set_availability(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<AvailabilityUpdate>,
) -> ApiResult<MenuItem> {
    let rid = user.restaurant_id;
    let item = menu_item::set_availability(&state.pool, rid, id, payload.is_available)
        .await?
        .ok_or_else(|| item_not_found(id))?;
    Ok(ok(item))
}

/// DELETE /api/menu/items/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    if !menu_item::delete(&state.pool, user.restaurant_id, id).await? {
        return Err(item_not_found(id));
    }
    Ok(ok(true))
}
