use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::models::user::UserEntity;
use crate::error::AppError;
use crate::utils::Claims;

// 缺字段按空串处理，统一走下面的校验逻辑而不是反序列化报错

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub token: String,
}

/// 对外暴露的用户信息，不带哈希和时间戳
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<&UserEntity> for PublicUser {
    fn from(user: &UserEntity) -> Self {
        PublicUser {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

impl From<Claims> for PublicUser {
    fn from(claims: Claims) -> Self {
        PublicUser {
            id: claims.sub,
            username: claims.username,
            email: claims.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub message: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MeUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: MeUser,
}

/// 注册入参校验
pub fn validate_registration(req: &RegisterRequest) -> Result<(), AppError> {
    if req.username.is_empty() || req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation("All fields are required".into()));
    }

    if req.password.len() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }

    Ok(())
}
