use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use itemhub_backend::{AppState, config::Config, middleware::log_errors, routes};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    // 数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'api_service';").await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Redis客户端：条目缓存
    let redis_client =
        redis::Client::open(config.redis_url.clone()).expect("Failed to create Redis client");

    // 去鉴权服务的校验请求，超时按上游错误上报
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("Failed to create HTTP client");

    let state = AppState {
        pool,
        config: config.clone(),
        redis: Arc::new(redis_client),
        http,
    };

    let router = routes::items::router(state).layer(axum::middleware::from_fn(log_errors));

    // 开发模式放开CORS
    #[cfg(debug_assertions)]
    let router = router.layer(tower_http::cors::CorsLayer::permissive());

    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to unspecified");
            IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("API service listening on {}", addr);
    tracing::info!("Auth service: {}", config.auth_service_url);

    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router,
    )
    .await
    .expect("Failed to start server");
}
