//! 广播协议 (BroadcastProtocol)
//!
//! 建立在 [`Session`](crate::session::Session) 之上的消息路由：
//!
//! | type | 方向 | 效果 |
//! |------|------|------|
//! | `config-init` | 管理员 → 服务端 | 仅向该连接回复当前 AdminConfig |
//! | `config-updated` | 管理员 → 服务端 | 校验 key，替换 AdminConfig，不转发 |
//! | `update-url` | 服务端 → 学员 | 推送给所有非管理员连接 |
//!
//! 协议错误 (格式错误、未知 type / key) 只丢弃并记录日志，连接保持打开。

pub mod broadcast;
pub mod handler;

use shared::workshop::UnknownToggleKey;
use thiserror::Error;

pub use broadcast::{BroadcastReport, broadcast_url};
pub use handler::{dispatch, handle_text, parse_frame};

/// 协议错误 - 本地恢复，不会关闭连接
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    Malformed(String),

    #[error("unknown message type: {0}")]
    UnknownType(String),

    #[error(transparent)]
    UnknownKey(#[from] UnknownToggleKey),

    #[error("connection not registered")]
    NotRegistered,
}
