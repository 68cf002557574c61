use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 启动配置错误 - 启动阶段立即失败，交给运维处理
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("未知启动选项: {0}")]
    UnknownOption(String),

    #[error("缺少必需选项: {0}")]
    MissingOption(&'static str),

    #[error("无效启动选项: {0}")]
    Invalid(String),

    #[error("已配置管理员密码但缺少签名密钥 (appKey)")]
    MissingSigningSecret,

    #[error("读取配置文件失败 {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// HTTP 处理器错误
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("未授权")]
    Unauthorized,

    #[error("内部服务器错误")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            // 登录失败不返回响应体
            ServerError::Unauthorized => return StatusCode::UNAUTHORIZED.into_response(),
            ServerError::Internal(err) => {
                // 记录内部错误但不暴露详细信息
                tracing::error!(error = ?err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// 处理器的 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
