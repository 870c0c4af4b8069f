use serde::{Deserialize, Serialize};

use crate::database::models::item::ItemEntity;

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
}

/// 缓存读路径的响应信封，标明数据来源
#[derive(Debug, Serialize)]
pub struct SourcedResponse<T> {
    pub source: &'static str,
    pub data: T,
}

impl<T> SourcedResponse<T> {
    pub fn cache(data: T) -> Self {
        SourcedResponse {
            source: "cache",
            data,
        }
    }

    pub fn database(data: T) -> Self {
        SourcedResponse {
            source: "database",
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: String,
    pub data: ItemEntity,
}

/// 每用户条目统计，字段名沿用对外的camelCase约定
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStats {
    pub total_items: i64,
    pub user_id: i64,
    pub username: String,
}
