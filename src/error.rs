use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// 服务级错误分类，每一类对应固定的HTTP状态码
#[derive(Debug)]
pub enum AppError {
    /// 请求参数缺失或非法，客户端可修正后重试
    Validation(String),
    /// 唯一性冲突
    Conflict(String),
    /// 凭证无效或已被撤销
    Auth(String),
    /// 资源不存在，或不属于当前用户
    NotFound(String),
    /// 数据库、缓存或对端服务不可用，内部细节只进日志
    Upstream(String),
}

impl AppError {
    /// 登录失败只返回这一个错误：用户不存在和密码错误不可区分
    pub fn invalid_credentials() -> Self {
        AppError::Auth("Invalid credentials".into())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Upstream(detail) => {
                tracing::error!("Upstream failure: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        // 并发注册会绕过预检，唯一约束冲突是竞争的正常结局而非上游故障
        if let sqlx::Error::Database(db_err) = &e {
            if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) {
                return AppError::Conflict("Username or email already exists".into());
            }
        }

        AppError::Upstream(format!("database error: {}", e))
    }
}

impl From<redis::RedisError> for AppError {
    fn from(e: redis::RedisError) -> Self {
        AppError::Upstream(format!("redis error: {}", e))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Upstream(format!("auth service request failed: {}", e))
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(e: bcrypt::BcryptError) -> Self {
        AppError::Upstream(format!("bcrypt error: {}", e))
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::Auth("Token expired".into())
            }
            _ => AppError::Auth("Invalid token".into()),
        }
    }
}
