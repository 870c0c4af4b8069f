use serde::{Deserialize, Serialize};

/// 会话记录：令牌可撤销性的来源
///
/// 签名有效但没有对应会话记录的令牌视为作废，
/// 这样登出不用等令牌自身过期。
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CachedSession {
    pub user_id: i64,
    pub username: String,
}
