use std::sync::Arc;

use redis::{AsyncCommands, Client as RedisClient};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// 条目列表缓存TTL（秒）
pub const ITEMS_TTL_SECS: u64 = 60;

/// 单条目缓存TTL（秒）
pub const ITEM_TTL_SECS: u64 = 300;

/// 统计缓存TTL（秒），写操作不会使它失效
pub const STATS_TTL_SECS: u64 = 120;

/// 旁路缓存读写操作
pub struct ItemCacheOperations;

impl ItemCacheOperations {
    pub async fn get_json<T: DeserializeOwned>(
        redis: &Arc<RedisClient>,
        key: &str,
    ) -> Result<Option<T>, redis::RedisError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;

        let result: Option<String> = conn.get(key).await?;

        match result {
            Some(json) => {
                let value = serde_json::from_str(&json).map_err(|e| {
                    redis::RedisError::from((
                        redis::ErrorKind::IoError,
                        "deserialize error",
                        e.to_string(),
                    ))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub async fn set_json<T: Serialize>(
        redis: &Arc<RedisClient>,
        key: &str,
        value: &T,
        ttl: u64,
    ) -> Result<(), redis::RedisError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;

        let json = serde_json::to_string(value).map_err(|e| {
            redis::RedisError::from((redis::ErrorKind::IoError, "serialize error", e.to_string()))
        })?;

        let _: () = conn.set_ex(key, json, ttl).await?;

        Ok(())
    }

    /// 写操作成功后、响应客户端前同步调用
    /// 删除不存在的键不算错误，失效是幂等的
    pub async fn invalidate(
        redis: &Arc<RedisClient>,
        keys: &[String],
    ) -> Result<(), redis::RedisError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;

        let _: () = conn.del(keys).await?;

        Ok(())
    }
}
