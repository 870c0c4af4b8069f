use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// users 表实体
///
/// 身份字段创建后不再变化，只有 last_login 在每次登录成功后更新。
/// 明文密码从不落库。
#[derive(Debug, Serialize, FromRow)]
pub struct UserEntity {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}
