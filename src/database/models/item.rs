use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// items 表实体，属主唯一，跨用户不可见
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ItemEntity {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}
