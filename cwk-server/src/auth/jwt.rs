//! JWT 令牌服务
//!
//! 管理员登录成功后签发 HS256 令牌，密钥为 workshop 配置中的 `appKey`。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 令牌有效期 (小时)
pub const TOKEN_TTL_HOURS: i64 = 12;

/// 存储在令牌中的 JWT Claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// 登录时提交的用户名 (`cwk-user` 头)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// 过期时间戳
    pub exp: i64,
    /// 签发时间戳
    pub iat: i64,
}

/// JWT 错误
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("无效令牌: {0}")]
    InvalidToken(String),

    #[error("令牌已过期")]
    ExpiredToken,

    #[error("无效签名")]
    InvalidSignature,

    #[error("令牌生成失败: {0}")]
    GenerationFailed(String),
}

/// JWT 令牌服务
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 不输出密钥
        f.debug_struct("JwtService").field("ttl", &self.ttl).finish()
    }
}

impl JwtService {
    /// 使用签名密钥创建服务
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(TOKEN_TTL_HOURS),
        }
    }

    /// 为管理员生成新令牌
    pub fn generate_token(&self, username: Option<&str>) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            username: username.map(str::to_string),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// 验证并解码令牌
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_generation_and_validation() {
        let service = JwtService::new("workshop-app-key");
        let token = service
            .generate_token(Some("instructor"))
            .expect("Failed to generate test token");

        let claims = service
            .validate_token(&token)
            .expect("Failed to validate test token");

        assert_eq!(claims.username.as_deref(), Some("instructor"));
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_HOURS * 3600);
    }

    #[test]
    fn test_token_without_username() {
        let service = JwtService::new("workshop-app-key");
        let token = service.generate_token(None).unwrap();
        assert_eq!(service.validate_token(&token).unwrap().username, None);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = JwtService::new("right-key")
            .generate_token(Some("instructor"))
            .unwrap();

        let err = JwtService::new("wrong-key").validate_token(&token).unwrap_err();
        assert!(matches!(err, JwtError::InvalidSignature));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = JwtService::new("workshop-app-key");
        let now = Utc::now().timestamp();
        let claims = Claims {
            username: Some("instructor".into()),
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"workshop-app-key"),
        )
        .unwrap();

        assert!(matches!(
            service.validate_token(&token),
            Err(JwtError::ExpiredToken)
        ));
    }

    #[test]
    fn test_debug_hides_secret() {
        let debug = format!("{:?}", JwtService::new("super-secret"));
        assert!(!debug.contains("super-secret"));
    }
}
