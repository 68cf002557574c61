//! 出站广播
//!
//! `update-url` 推送给所有学员连接，管理员连接永远不接收
//! (管理员页面不会注入跟随模式脚本)。
//! 广播不等待网络：只写入每个连接的发送缓冲。

use std::sync::Arc;

use shared::workshop::ServerMessage;

use crate::session::{SendOutcome, Session};

/// 一次广播的结果统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub dropped: usize,
    /// 已断开并被清理的连接数
    pub gone: usize,
}

/// 向所有非管理员连接推送 `update-url`
///
/// 目标已断开时静默清理，不视为错误。
pub fn broadcast_url(session: &Session, url: &str) -> BroadcastReport {
    let msg = ServerMessage::UpdateUrl {
        data: url.to_string(),
    };
    let json: Arc<str> = match serde_json::to_string(&msg) {
        Ok(json) => Arc::from(json),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize update-url");
            return BroadcastReport::default();
        }
    };

    let registry = session.registry();
    let mut report = BroadcastReport::default();

    for conn in registry.participants() {
        match conn.send(json.clone()) {
            SendOutcome::Delivered => report.delivered += 1,
            SendOutcome::Dropped => {
                tracing::warn!(conn_id = %conn.id, "Send buffer full, update-url dropped");
                report.dropped += 1;
            }
            SendOutcome::Gone => {
                registry.unregister(conn.id);
                report.gone += 1;
            }
        }
    }

    tracing::debug!(
        url,
        delivered = report.delivered,
        dropped = report.dropped,
        gone = report.gone,
        "Broadcast update-url"
    );
    report
}
