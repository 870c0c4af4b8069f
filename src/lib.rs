use std::sync::Arc;

use redis::Client as RedisClient;
use sqlx::PgPool;

use config::Config;

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod utils;

/// 两个服务共用的应用状态，所有外部句柄在启动时显式构造并注入
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub redis: Arc<RedisClient>,
    pub http: reqwest::Client,
}
