use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;

use crate::{
    AppState,
    cache::{
        ItemCacheOperations, keys,
        operations::item::{ITEM_TTL_SECS, ITEMS_TTL_SECS, STATS_TTL_SECS},
    },
    database::{ItemRepository, models::item::ItemEntity},
    error::AppError,
    middleware::AuthUser,
};

use super::model::{
    CreateItemRequest, DeletedResponse, ItemStats, SourcedResponse, UpdateItemRequest,
};

#[axum::debug_handler]
pub async fn list_items(
    Extension(user): Extension<AuthUser>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let key = keys::items_key(user.id);

    if let Some(items) =
        ItemCacheOperations::get_json::<Vec<ItemEntity>>(&state.redis, &key).await?
    {
        tracing::debug!("Cache hit: {}", key);
        return Ok(Json(SourcedResponse::cache(items)));
    }

    let items = ItemRepository::list_by_owner(&state.pool, user.id).await?;
    ItemCacheOperations::set_json(&state.redis, &key, &items, ITEMS_TTL_SECS).await?;

    tracing::debug!("Cache miss - fetched {} items from database", items.len());
    Ok(Json(SourcedResponse::database(items)))
}

#[axum::debug_handler]
pub async fn create_item(
    Extension(user): Extension<AuthUser>,
    State(state): State<AppState>,
    Json(req): Json<CreateItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.title.is_empty() {
        return Err(AppError::Validation("Title is required".into()));
    }

    let item =
        ItemRepository::create(&state.pool, user.id, &req.title, req.description.as_deref())
            .await?;

    // 列表缓存必须在响应前失效；单条缓存此时还不存在
    ItemCacheOperations::invalidate(&state.redis, &[keys::items_key(user.id)]).await?;

    tracing::info!("Item created: {}", item.id);
    Ok((StatusCode::CREATED, Json(item)))
}

/// 缓存命中也要做属主校验，别人的条目和不存在的条目不可区分
fn check_item_owner(item: ItemEntity, owner_id: i64) -> Result<ItemEntity, AppError> {
    if item.user_id != owner_id {
        return Err(AppError::NotFound("Item not found".into()));
    }

    Ok(item)
}

#[axum::debug_handler]
pub async fn get_item(
    Extension(user): Extension<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let key = keys::item_key(id);

    if let Some(item) = ItemCacheOperations::get_json::<ItemEntity>(&state.redis, &key).await? {
        let item = check_item_owner(item, user.id)?;
        return Ok(Json(SourcedResponse::cache(item)));
    }

    let item = ItemRepository::find_for_owner(&state.pool, id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".into()))?;

    ItemCacheOperations::set_json(&state.redis, &key, &item, ITEM_TTL_SECS).await?;

    Ok(Json(SourcedResponse::database(item)))
}

#[axum::debug_handler]
pub async fn update_item(
    Extension(user): Extension<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.title.is_empty() {
        return Err(AppError::Validation("Title is required".into()));
    }

    let item = ItemRepository::update_for_owner(
        &state.pool,
        id,
        user.id,
        &req.title,
        req.description.as_deref(),
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Item not found".into()))?;

    ItemCacheOperations::invalidate(
        &state.redis,
        &[keys::items_key(user.id), keys::item_key(id)],
    )
    .await?;

    tracing::info!("Item updated: {}", id);
    Ok(Json(item))
}

#[axum::debug_handler]
pub async fn delete_item(
    Extension(user): Extension<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let item = ItemRepository::delete_for_owner(&state.pool, id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".into()))?;

    ItemCacheOperations::invalidate(
        &state.redis,
        &[keys::items_key(user.id), keys::item_key(id)],
    )
    .await?;

    tracing::info!("Item deleted: {}", id);
    Ok(Json(DeletedResponse {
        message: "Item deleted".into(),
        data: item,
    }))
}

#[axum::debug_handler]
pub async fn stats(
    Extension(user): Extension<AuthUser>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let key = keys::stats_key(user.id);

    if let Some(stats) = ItemCacheOperations::get_json::<ItemStats>(&state.redis, &key).await? {
        return Ok(Json(SourcedResponse::cache(stats)));
    }

    let total = ItemRepository::count_for_owner(&state.pool, user.id).await?;
    let stats = ItemStats {
        total_items: total,
        user_id: user.id,
        username: user.username.clone(),
    };

    // 条目写操作不会使这个键失效，计数最多滞后一个TTL窗口
    ItemCacheOperations::set_json(&state.redis, &key, &stats, STATS_TTL_SECS).await?;

    Ok(Json(SourcedResponse::database(stats)))
}

#[axum::debug_handler]
pub async fn index() -> impl IntoResponse {
    Json(json!({
        "service": "API Service",
        "version": "1.0.0",
        "endpoints": [
            "GET  /health",
            "GET  /api/items",
            "POST /api/items",
            "GET  /api/items/:id",
            "PUT  /api/items/:id",
            "DELETE /api/items/:id",
            "GET  /api/stats",
        ]
    }))
}

#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match check_backends(&state).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "service": "api",
                "database": "connected",
                "cache": "connected",
                "timestamp": Utc::now().to_rfc3339(),
            })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "status": "unhealthy",
                "error": e,
            })),
        ),
    }
}

async fn check_backends(state: &AppState) -> Result<(), String> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.pool)
        .await
        .map_err(|e| e.to_string())?;

    let mut conn = state
        .redis
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| e.to_string())?;
    let _: String = redis::cmd("PING")
        .query_async(&mut conn)
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}
