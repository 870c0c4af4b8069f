use std::sync::Arc;

use redis::{AsyncCommands, Client as RedisClient};

use crate::cache::keys;
use crate::cache::models::session::CachedSession;

/// 会话记录操作
pub struct SessionCacheOperations;

impl SessionCacheOperations {
    /// 写入会话记录，TTL 与令牌有效期一致
    pub async fn store_session(
        redis: &Arc<RedisClient>,
        token: &str,
        session: &CachedSession,
        ttl: u64,
    ) -> Result<(), redis::RedisError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;

        let json = serde_json::to_string(session).map_err(|e| {
            redis::RedisError::from((redis::ErrorKind::IoError, "serialize error", e.to_string()))
        })?;

        let _: () = conn.set_ex(keys::token_key(token), json, ttl).await?;

        Ok(())
    }

    /// 查会话记录，不存在返回 None
    pub async fn get_session(
        redis: &Arc<RedisClient>,
        token: &str,
    ) -> Result<Option<CachedSession>, redis::RedisError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;

        let result: Option<String> = conn.get(keys::token_key(token)).await?;

        match result {
            Some(json) => {
                let session = serde_json::from_str(&json).map_err(|e| {
                    redis::RedisError::from((
                        redis::ErrorKind::IoError,
                        "deserialize error",
                        e.to_string(),
                    ))
                })?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    /// 删除会话记录，键不存在也算成功（登出是幂等的）
    pub async fn remove_session(
        redis: &Arc<RedisClient>,
        token: &str,
    ) -> Result<(), redis::RedisError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;

        let _: () = conn.del(keys::token_key(token)).await?;

        Ok(())
    }

    /// 刷新令牌时旧键删除和新键写入放在一个事务里，
    /// 避免出现两个并发有效会话的窗口
    pub async fn replace_session(
        redis: &Arc<RedisClient>,
        old_token: &str,
        new_token: &str,
        session: &CachedSession,
        ttl: u64,
    ) -> Result<(), redis::RedisError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;

        let json = serde_json::to_string(session).map_err(|e| {
            redis::RedisError::from((redis::ErrorKind::IoError, "serialize error", e.to_string()))
        })?;

        let _: () = redis::pipe()
            .atomic()
            .del(keys::token_key(old_token))
            .ignore()
            .set_ex(keys::token_key(new_token), json, ttl)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(())
    }
}
