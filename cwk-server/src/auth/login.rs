//! 管理员登录 (`POST /api/login`)
//!
//! 请求头 `cwk-admin-password` 与 workshop 密码完全相等时签发令牌，
//! 否则返回 401 且不带响应体。

use axum::{Json, extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};

use super::jwt::JwtService;
use crate::core::error::{ConfigError, ServerError};
use crate::core::workshop::WorkshopConfig;
use crate::core::ServerState;
use crate::security_log;

pub const ADMIN_PASSWORD_HEADER: &str = "cwk-admin-password";
pub const USER_HEADER: &str = "cwk-user";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// 管理员认证门
pub struct AdminGate {
    password: String,
    jwt: JwtService,
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate").field("jwt", &self.jwt).finish()
    }
}

impl AdminGate {
    pub fn new(password: impl Into<String>, app_key: &str) -> Self {
        Self {
            password: password.into(),
            jwt: JwtService::new(app_key),
        }
    }

    /// 根据 workshop 文件构建，未配置密码时返回 `None`
    pub fn from_workshop(workshop: &WorkshopConfig) -> Result<Option<Self>, ConfigError> {
        let Some(password) = workshop.admin_password.as_deref().filter(|p| !p.is_empty()) else {
            return Ok(None);
        };
        let app_key = workshop
            .app_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingSigningSecret)?;

        Ok(Some(Self::new(password, app_key)))
    }

    // TODO: constant-time comparison and attempt limiting for shared networks
    pub fn password_matches(&self, provided: &str) -> bool {
        self.password == provided
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }
}

/// 登录处理器
pub async fn login(
    State(state): State<ServerState>,
    headers: HeaderMap,
) -> Result<Json<LoginResponse>, ServerError> {
    let user = header_str(&headers, USER_HEADER);

    let Some(gate) = state.admin_gate.as_deref() else {
        security_log!(WARN, "admin_login_failed", user = user.unwrap_or("-"), reason = "no_admin_password");
        return Err(ServerError::Unauthorized);
    };

    match header_str(&headers, ADMIN_PASSWORD_HEADER) {
        Some(provided) if gate.password_matches(provided) => {
            let token = gate
                .jwt()
                .generate_token(user)
                .map_err(|e| ServerError::Internal(e.into()))?;

            security_log!(INFO, "admin_login", user = user.unwrap_or("-"));
            Ok(Json(LoginResponse { token }))
        }
        provided => {
            let reason = if provided.is_some() {
                "invalid_password"
            } else {
                "missing_password"
            };
            security_log!(WARN, "admin_login_failed", user = user.unwrap_or("-"), reason = reason);
            Err(ServerError::Unauthorized)
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
