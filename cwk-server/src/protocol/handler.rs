//! 入站消息处理
//!
//! 同一连接的帧在其读循环中按到达顺序逐个处理，
//! `config-updated` 在读取下一帧之前已写入会话状态。

use serde_json::Value;
use shared::workshop::{CONFIG_INIT, CONFIG_UPDATED, ClientMessage, ServerMessage, ToggleKey};

use super::ProtocolError;
use crate::session::{ConnectionId, SendOutcome, Session};

/// 解析一帧文本
///
/// 先读取信封中的 `type`，区分 "未知类型" 与 "格式错误"。
pub fn parse_frame(text: &str) -> Result<ClientMessage, ProtocolError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))?;

    let msg_type = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ProtocolError::Malformed("missing \"type\"".to_string()))?;

    if msg_type != CONFIG_INIT && msg_type != CONFIG_UPDATED {
        return Err(ProtocolError::UnknownType(msg_type.to_string()));
    }

    serde_json::from_value(value).map_err(|e| ProtocolError::Malformed(e.to_string()))
}

/// 处理一条已解析的消息
pub fn dispatch(
    session: &Session,
    conn_id: ConnectionId,
    msg: ClientMessage,
) -> Result<(), ProtocolError> {
    let registry = session.registry();

    match msg {
        ClientMessage::ConfigInit => {
            // 只有管理员侧边栏会请求配置
            registry.mark_admin(conn_id);
            let conn = registry.get(conn_id).ok_or(ProtocolError::NotRegistered)?;
            let config = session.get_state().admin_config;

            if conn.send_message(&ServerMessage::ConfigInit { config }) == SendOutcome::Gone {
                registry.unregister(conn_id);
            }
            Ok(())
        }
        ClientMessage::ConfigUpdated {
            config,
            key,
            by_admin,
        } => {
            let key: ToggleKey = key.parse()?;
            registry.mark_admin(conn_id);

            let value = config.get(key);
            let next = session.update(|state| {
                state.admin_config = state.admin_config.with(key, value);
            });

            tracing::info!(
                conn_id = %conn_id,
                key = %key,
                value,
                by_admin = by_admin.as_deref().unwrap_or("-"),
                admin_config = ?next.admin_config,
                "Admin config updated"
            );
            Ok(())
        }
    }
}

/// 处理一帧文本，错误只记录日志
pub fn handle_text(session: &Session, conn_id: ConnectionId, text: &str) {
    let result = parse_frame(text).and_then(|msg| {
        tracing::debug!(conn_id = %conn_id, msg_type = msg.type_name(), "Received frame");
        dispatch(session, conn_id, msg)
    });

    if let Err(e) = result {
        tracing::warn!(conn_id = %conn_id, error = %e, "Dropping frame");
    }
}
