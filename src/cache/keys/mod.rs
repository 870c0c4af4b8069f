/// 会话记录键前缀，键随令牌走
const TOKEN_PREFIX: &str = "token:";

/// 用户条目列表缓存键前缀
const ITEMS_PREFIX: &str = "items:user:";

/// 单条目缓存键前缀
const ITEM_PREFIX: &str = "item:";

/// 用户统计缓存键前缀
const STATS_PREFIX: &str = "stats:";

/// 生成会话记录键
pub fn token_key(token: &str) -> String {
    format!("{}{}", TOKEN_PREFIX, token)
}

/// 生成某个用户的条目列表缓存键
pub fn items_key(owner_id: i64) -> String {
    format!("{}{}", ITEMS_PREFIX, owner_id)
}

/// 生成单条目缓存键
pub fn item_key(item_id: i64) -> String {
    format!("{}{}", ITEM_PREFIX, item_id)
}

/// 生成用户统计缓存键
pub fn stats_key(owner_id: i64) -> String {
    format!("{}{}", STATS_PREFIX, owner_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_shapes() {
        assert_eq!(token_key("abc.def.ghi"), "token:abc.def.ghi");
        assert_eq!(items_key(42), "items:user:42");
        assert_eq!(item_key(7), "item:7");
        assert_eq!(stats_key(42), "stats:42");
    }

    #[test]
    fn collection_keys_are_scoped_per_owner() {
        assert_ne!(items_key(1), items_key(2));
        assert_ne!(stats_key(1), stats_key(2));
    }
}
