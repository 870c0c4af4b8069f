use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use itemhub_backend::{AppState, config::Config, routes};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

// 懒连接池：下面覆盖的路径都在访问存储之前返回，
// 不需要真实的Postgres和Redis
fn test_app() -> Router {
    let config = Config {
        database_url: "postgres://localhost:5432/itemhub_test".into(),
        redis_url: "redis://127.0.0.1:6379/".into(),
        jwt_secret: "test-secret".into(),
        jwt_expiration_secs: 24 * 3600,
        auth_service_url: "http://localhost:3002".into(),
        server_host: "127.0.0.1".into(),
        server_port: 0,
    };

    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database_url)
        .expect("lazy pool");
    let redis = Arc::new(redis::Client::open(config.redis_url.clone()).expect("redis client"));

    routes::auth::router(AppState {
        pool,
        config,
        redis,
        http: reqwest::Client::new(),
    })
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn index_lists_endpoints() {
    let response = test_app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["service"], "Auth Service");
    assert!(body["endpoints"].as_array().unwrap().len() >= 6);
}

#[tokio::test]
async fn register_rejects_missing_fields() {
    let response = test_app()
        .oneshot(post_json("/register", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "All fields are required");
}

#[tokio::test]
async fn register_rejects_short_password() {
    let response = test_app()
        .oneshot(post_json(
            "/register",
            r#"{"username":"alice","email":"alice@example.com","password":"abc"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Password must be at least 6 characters");
}

#[tokio::test]
async fn login_rejects_missing_fields() {
    let response = test_app()
        .oneshot(post_json("/login", r#"{"username":"alice"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Username and password are required");
}

#[tokio::test]
async fn logout_without_token_is_rejected() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "No token provided");
}

#[tokio::test]
async fn refresh_without_token_is_rejected() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/refresh")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "No token provided");
}

#[tokio::test]
async fn refresh_rejects_forged_token() {
    // 签名不对的令牌在任何存储访问之前就被拒
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/refresh")
                .header(header::AUTHORIZATION, "Bearer not.a.jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn verify_without_token_is_rejected() {
    let response = test_app()
        .oneshot(post_json("/verify", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "No token provided");
}

#[tokio::test]
async fn me_without_token_is_unauthorized() {
    let response = test_app()
        .oneshot(Request::builder().uri("/me").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "No token provided");
}

#[tokio::test]
async fn me_rejects_garbage_token() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/me")
                .header(header::AUTHORIZATION, "Bearer garbage")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid token");
}
