use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

use crate::{AppState, error::AppError};

/// 鉴权通过后注入请求扩展的用户身份
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Deserialize)]
struct VerifyResponse {
    user: AuthUser,
}

#[derive(Deserialize)]
struct VerifyErrorBody {
    error: String,
}

/// API 服务的鉴权中间件
///
/// 令牌对本服务是不透明的，这里不解析内容，整体转发给鉴权服务的
/// /verify 做校验。校验失败在访问数据库和缓存之前就短路返回。
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // 空令牌本地短路：这是凭证问题不是上游故障，不值得一次校验调用
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Auth("No token provided".into()))?
        .to_string();

    let url = format!("{}/verify", state.config.auth_service_url);
    let response = state
        .http
        .post(&url)
        .json(&serde_json::json!({ "token": token }))
        .send()
        .await
        .map_err(|e| AppError::Upstream(format!("auth service unreachable: {}", e)))?;

    if response.status() == StatusCode::UNAUTHORIZED {
        // 鉴权服务的401原样传给客户端，不重试
        let message = response
            .json::<VerifyErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| "Invalid token".to_string());
        return Err(AppError::Auth(message));
    }

    if !response.status().is_success() {
        return Err(AppError::Upstream(format!(
            "auth service returned {}",
            response.status()
        )));
    }

    let verified: VerifyResponse = response
        .json()
        .await
        .map_err(|e| AppError::Upstream(format!("invalid verify response: {}", e)))?;

    tracing::debug!("Authenticated user: {}", verified.user.username);
    request.extensions_mut().insert(verified.user);

    Ok(next.run(request).await)
}
