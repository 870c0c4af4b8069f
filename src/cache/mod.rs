// 缓存模块
// 会话记录和条目缓存都走这里，键格式统一在 keys 中定义

pub mod keys;
pub mod models;
pub mod operations;

pub use models::session::CachedSession;
pub use operations::item::ItemCacheOperations;
pub use operations::session::SessionCacheOperations;
