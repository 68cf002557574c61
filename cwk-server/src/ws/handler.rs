//! WebSocket 端点
//!
//! GET /wds[?role=admin]
//!
//! 每个连接一个任务：`select!` 同时处理入站帧、出站缓冲和心跳。
//! 入站帧按到达顺序逐个处理。

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::time::Duration;

use crate::core::ServerState;
use crate::protocol;
use crate::session::{ConnectionHandle, Role};

/// 心跳间隔
const PING_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    role: Option<String>,
}

impl WsQuery {
    pub fn role(&self) -> Role {
        match self.role.as_deref() {
            Some("admin") => Role::Admin,
            _ => Role::Participant,
        }
    }
}

/// GET /wds
pub async fn handle_ws(
    State(state): State<ServerState>,
    Query(query): Query<WsQuery>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let role = query.role();
    ws.on_upgrade(move |socket| ws_session(socket, state, role, peer))
}

async fn ws_session(socket: WebSocket, state: ServerState, role: Role, peer: SocketAddr) {
    let (mut sink, mut stream) = socket.split();
    let session = state.session().clone();
    let registry = session.registry();

    let (handle, mut outbound) = ConnectionHandle::channel(role, Some(peer));
    let conn_id = handle.id;
    registry.register(Arc::new(handle));

    tracing::info!(conn_id = %conn_id, peer = %peer, role = ?role, "WS connected");

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            text = outbound.recv() => {
                // 连接被注销后通道关闭
                let Some(text) = text else { break };
                if sink.send(Message::Text(text.to_string().into())).await.is_err() {
                    break;
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        protocol::handle_text(&session, conn_id, text.as_str());
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // Ping/Pong 由 axum 处理，二进制帧忽略
                    Some(Err(e)) => {
                        tracing::debug!(conn_id = %conn_id, error = %e, "WS read error");
                        break;
                    }
                }
            }
        }
    }

    // 先注销，之后的广播不会再选中该连接
    registry.unregister(conn_id);
    let _ = sink.close().await;

    tracing::info!(conn_id = %conn_id, remaining = registry.len(), "WS disconnected");
}
