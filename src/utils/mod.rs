use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;

/// 登录失败路径上的空比对基准值（"password" 的 bcrypt 哈希）
const DUMMY_HASH: &str = "$2a$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy";

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password.as_bytes(), DEFAULT_COST)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password.as_bytes(), hash)
}

/// 用户不存在时也执行一次哈希比对，让两条失败路径耗时一致
pub fn dummy_verify(password: &str) {
    let _ = verify(password.as_bytes(), DUMMY_HASH);
}

/// 令牌中自包含的声明
///
/// jti 保证同一秒内给同一用户签发的两个令牌也互不相同，
/// 会话记录按令牌本身为键，两者必须能独立撤销。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub email: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn generate_token(
    user_id: i64,
    username: &str,
    email: &str,
    config: &Config,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::seconds(config.jwt_expiration().as_secs() as i64))
        .expect("valid timestamp")
        .timestamp();

    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        email: email.to_string(),
        jti: Uuid::new_v4().to_string(),
        iat: now.timestamp(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
}

/// 校验签名和过期时间
pub fn verify_token(token: &str, config: &Config) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// 刷新场景专用：跳过过期校验，签名被篡改的仍然拒绝
pub fn decode_expired_token(
    token: &str,
    config: &Config,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/itemhub_test".into(),
            redis_url: "redis://127.0.0.1/".into(),
            jwt_secret: "test-secret".into(),
            jwt_expiration_secs: 24 * 3600,
            auth_service_url: "http://localhost:3002".into(),
            server_host: "127.0.0.1".into(),
            server_port: 0,
        }
    }

    fn expired_token(config: &Config) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            username: "bob".into(),
            email: "bob@example.com".into(),
            jti: "11111111-2222-3333-4444-555555555555".into(),
            iat: now - 7200,
            exp: now - 3600,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn token_round_trip_preserves_claims() {
        let config = test_config();
        let token = generate_token(42, "alice", "alice@example.com", &config).unwrap();

        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "alice@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn two_tokens_for_same_user_are_independent() {
        // 同一秒内签发的两个令牌也必须不同，否则登出一个会波及另一个
        let config = test_config();
        let t1 = generate_token(7, "alice", "alice@example.com", &config).unwrap();
        let t2 = generate_token(7, "alice", "alice@example.com", &config).unwrap();

        assert_ne!(t1, t2);
        assert!(verify_token(&t1, &config).is_ok());
        assert!(verify_token(&t2, &config).is_ok());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = test_config();
        let token = expired_token(&config);

        let err = verify_token(&token, &config).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ExpiredSignature));
    }

    #[test]
    fn expired_token_can_still_be_decoded_for_refresh() {
        let config = test_config();
        let token = expired_token(&config);

        let claims = decode_expired_token(&token, &config).unwrap();
        assert_eq!(claims.sub, 1);
        assert_eq!(claims.username, "bob");
    }

    #[test]
    fn forged_signature_fails_even_when_expiry_is_ignored() {
        let config = test_config();
        let other = Config {
            jwt_secret: "another-secret".into(),
            ..test_config()
        };
        let token = generate_token(9, "carol", "carol@example.com", &other).unwrap();

        assert!(decode_expired_token(&token, &config).is_err());
        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn password_hash_round_trip() {
        let hashed = hash_password("secret1").unwrap();
        assert_ne!(hashed, "secret1");
        assert!(verify_password("secret1", &hashed).unwrap());
        assert!(!verify_password("secret2", &hashed).unwrap());
    }

    #[test]
    fn dummy_verify_accepts_arbitrary_input() {
        dummy_verify("anything at all");
        dummy_verify("");
    }
}
