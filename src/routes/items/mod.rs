pub mod handler;
pub mod model;

use axum::{Router, middleware::from_fn_with_state, routing::get};

use crate::{AppState, middleware::auth_middleware};

/// API服务路由，/api 下的全部路由先过委托鉴权中间件
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/api/items",
            get(handler::list_items).post(handler::create_item),
        )
        .route(
            "/api/items/{id}",
            get(handler::get_item)
                .put(handler::update_item)
                .delete(handler::delete_item),
        )
        .route("/api/stats", get(handler::stats))
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/", get(handler::index))
        .route("/health", get(handler::health))
        .merge(protected)
        .with_state(state)
}
