pub mod handler;
pub mod model;

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

/// 鉴权服务路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handler::index))
        .route("/health", get(handler::health))
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        .route("/logout", post(handler::logout))
        .route("/verify", post(handler::verify))
        .route("/refresh", post(handler::refresh))
        .route("/me", get(handler::me))
        .with_state(state)
}
