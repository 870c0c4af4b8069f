use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use chrono::Utc;
use serde_json::json;

use crate::{
    AppState,
    cache::{CachedSession, SessionCacheOperations},
    config::Config,
    database::UserRepository,
    error::AppError,
    utils::{self, Claims},
};

use super::model::{
    AuthResponse, LoginRequest, MeResponse, MeUser, MessageResponse, PublicUser, RefreshResponse,
    RegisterRequest, VerifyRequest, VerifyResponse, validate_registration,
};

/// 从 Authorization 头中取出 bearer 令牌
fn bearer_token(header: Option<TypedHeader<Authorization<Bearer>>>) -> Result<String, AppError> {
    header
        .map(|TypedHeader(auth)| auth.token().to_string())
        .ok_or_else(|| AppError::Validation("No token provided".into()))
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_registration(&req)?;

    if UserRepository::username_or_email_exists(&state.pool, &req.username, &req.email).await? {
        return Err(AppError::Conflict("Username or email already exists".into()));
    }

    let password_hash = utils::hash_password(&req.password)?;
    let user = UserRepository::create(&state.pool, &req.username, &req.email, &password_hash)
        .await?;

    let token = utils::generate_token(user.id, &user.username, &user.email, &state.config)?;
    let session = CachedSession {
        user_id: user.id,
        username: user.username.clone(),
    };
    SessionCacheOperations::store_session(
        &state.redis,
        &token,
        &session,
        state.config.jwt_expiration_secs,
    )
    .await?;

    tracing::info!("User registered: {}", user.username);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".into(),
            token,
            user: PublicUser::from(&user),
        }),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".into(),
        ));
    }

    let user = match UserRepository::find_by_username(&state.pool, &req.username).await? {
        Some(user) => user,
        None => {
            // 未知用户也做一次哈希比对，和密码错误分支耗时一致
            utils::dummy_verify(&req.password);
            return Err(AppError::invalid_credentials());
        }
    };

    if !utils::verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::invalid_credentials());
    }

    let token = utils::generate_token(user.id, &user.username, &user.email, &state.config)?;
    let session = CachedSession {
        user_id: user.id,
        username: user.username.clone(),
    };
    SessionCacheOperations::store_session(
        &state.redis,
        &token,
        &session,
        state.config.jwt_expiration_secs,
    )
    .await?;

    UserRepository::touch_last_login(&state.pool, user.id).await?;

    tracing::info!("User logged in: {}", user.username);

    Ok(Json(AuthResponse {
        message: "Login successful".into(),
        token,
        user: PublicUser::from(&user),
    }))
}

#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<impl IntoResponse, AppError> {
    let token = bearer_token(auth)?;

    SessionCacheOperations::remove_session(&state.redis, &token).await?;

    tracing::info!("User logged out");

    Ok(Json(MessageResponse {
        message: "Logout successful".into(),
    }))
}

/// 校验顺序固定：先看会话记录，再验签名和过期时间。
/// 已登出但签名还没过期的令牌在第一步被拒，不做签名计算。
fn check_session_then_signature(
    session: Option<CachedSession>,
    token: &str,
    config: &Config,
) -> Result<Claims, AppError> {
    if session.is_none() {
        return Err(AppError::Auth("Invalid or expired token".into()));
    }

    Ok(utils::verify_token(token, config)?)
}

/// 委托校验入口，API服务每个受保护请求都会打到这里
#[axum::debug_handler]
pub async fn verify(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.token.is_empty() {
        return Err(AppError::Validation("No token provided".into()));
    }

    let session = SessionCacheOperations::get_session(&state.redis, &req.token).await?;
    let claims = check_session_then_signature(session, &req.token, &state.config)?;

    Ok(Json(VerifyResponse {
        valid: true,
        user: PublicUser::from(claims),
    }))
}

#[axum::debug_handler]
pub async fn refresh(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<impl IntoResponse, AppError> {
    let old_token = bearer_token(auth)?;

    // 刚过期的令牌允许换新，签名被篡改的不行
    let claims = utils::decode_expired_token(&old_token, &state.config)
        .map_err(|_| AppError::Auth("Invalid token".into()))?;

    let token = utils::generate_token(claims.sub, &claims.username, &claims.email, &state.config)?;
    let session = CachedSession {
        user_id: claims.sub,
        username: claims.username.clone(),
    };
    SessionCacheOperations::replace_session(
        &state.redis,
        &old_token,
        &token,
        &session,
        state.config.jwt_expiration_secs,
    )
    .await?;

    tracing::info!("Token refreshed for user: {}", claims.username);

    Ok(Json(RefreshResponse {
        message: "Token refreshed".into(),
        token,
    }))
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<impl IntoResponse, AppError> {
    let token =
        bearer_token(auth).map_err(|_| AppError::Auth("No token provided".into()))?;

    let claims = utils::verify_token(&token, &state.config)?;

    let user = UserRepository::find_by_id(&state.pool, claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(Json(MeResponse {
        user: MeUser {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
            last_login: user.last_login,
        },
    }))
}

#[axum::debug_handler]
pub async fn index() -> impl IntoResponse {
    Json(json!({
        "service": "Auth Service",
        "version": "1.0.0",
        "endpoints": [
            "GET  /health",
            "POST /register",
            "POST /login",
            "POST /logout",
            "POST /verify",
            "POST /refresh",
            "GET  /me",
        ]
    }))
}

#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match check_backends(&state).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "service": "auth",
                "database": "connected",
                "cache": "connected",
                "timestamp": Utc::now().to_rfc3339(),
            })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "status": "unhealthy",
                "error": e,
            })),
        ),
    }
}

async fn check_backends(state: &AppState) -> Result<(), String> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.pool)
        .await
        .map_err(|e| e.to_string())?;

    let mut conn = state
        .redis
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| e.to_string())?;
    let _: String = redis::cmd("PING")
        .query_async(&mut conn)
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::generate_token;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost:5432/itemhub_test".into(),
            redis_url: "redis://127.0.0.1:6379/".into(),
            jwt_secret: "test-secret".into(),
            jwt_expiration_secs: 24 * 3600,
            auth_service_url: "http://localhost:3002".into(),
            server_host: "127.0.0.1".into(),
            server_port: 0,
        }
    }

    fn session_for(user_id: i64, username: &str) -> CachedSession {
        CachedSession {
            user_id,
            username: username.into(),
        }
    }

    #[test]
    fn revoked_token_is_rejected_despite_valid_signature() {
        // 签名和过期时间都没问题，但会话记录已删（登出后），必须被拒
        let config = test_config();
        let token = generate_token(1, "alice", "alice@example.com", &config).unwrap();

        match check_session_then_signature(None, &token, &config) {
            Err(AppError::Auth(msg)) => assert_eq!(msg, "Invalid or expired token"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn missing_session_is_checked_before_signature() {
        // 会话检查在前：没有会话时连签名都不用验，
        // 乱码令牌报的也是会话错误而不是签名错误
        let config = test_config();

        match check_session_then_signature(None, "not.a.jwt", &config) {
            Err(AppError::Auth(msg)) => assert_eq!(msg, "Invalid or expired token"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn live_session_with_valid_token_yields_claims() {
        let config = test_config();
        let token = generate_token(7, "bob", "bob@example.com", &config).unwrap();

        let claims =
            check_session_then_signature(Some(session_for(7, "bob")), &token, &config).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "bob");
    }

    #[test]
    fn live_session_with_forged_token_is_invalid() {
        let config = test_config();
        let wrong_key = Config {
            jwt_secret: "another-secret".into(),
            ..test_config()
        };
        let token = generate_token(7, "bob", "bob@example.com", &wrong_key).unwrap();

        match check_session_then_signature(Some(session_for(7, "bob")), &token, &config) {
            Err(AppError::Auth(msg)) => assert_eq!(msg, "Invalid token"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
