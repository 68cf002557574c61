//! 连接注册表 (ConnectionRegistry)
//!
//! 持有所有存活 WebSocket 连接的句柄。句柄只归注册表所有，
//! 广播时仅短暂借用 (`Arc` 克隆，不延长注册表条目的生命周期语义)。
//!
//! ```text
//! ws::handler ──register──▶ ConnectionRegistry ◀──snapshot── protocol::broadcast_url
//!      │                        │ id → Arc<ConnectionHandle>
//!      └──────unregister────────┘
//! ```

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use shared::workshop::ServerMessage;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

/// 每个连接的发送缓冲
pub const SEND_BUFFER: usize = 64;

/// 连接 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 连接角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// 讲师 (管理员侧边栏)
    Admin,
    /// 学员
    Participant,
}

/// 单次发送的结果
///
/// 目标已断开是正常结果，不是错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    /// 发送缓冲已满，消息被丢弃
    Dropped,
    /// 连接已关闭
    Gone,
}

/// 单个连接的句柄
#[derive(Debug)]
pub struct ConnectionHandle {
    pub id: ConnectionId,
    peer: Option<SocketAddr>,
    connected_at: Instant,
    admin: AtomicBool,
    alive: AtomicBool,
    tx: mpsc::Sender<Arc<str>>,
}

impl ConnectionHandle {
    /// 创建句柄和对应的接收端 (交给 socket 写任务)
    pub fn channel(role: Role, peer: Option<SocketAddr>) -> (Self, mpsc::Receiver<Arc<str>>) {
        let (tx, rx) = mpsc::channel(SEND_BUFFER);
        let handle = Self {
            id: ConnectionId::new(),
            peer,
            connected_at: Instant::now(),
            admin: AtomicBool::new(role == Role::Admin),
            alive: AtomicBool::new(true),
            tx,
        };
        (handle, rx)
    }

    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// 连接已存活的时长
    pub fn uptime(&self) -> Duration {
        self.connected_at.elapsed()
    }

    pub fn role(&self) -> Role {
        if self.admin.load(Ordering::Acquire) {
            Role::Admin
        } else {
            Role::Participant
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Role::Admin
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire) && !self.tx.is_closed()
    }

    /// 标记为已关闭，之后的发送都返回 [`SendOutcome::Gone`]
    pub fn close(&self) {
        self.alive.store(false, Ordering::Release);
    }

    fn promote(&self) {
        self.admin.store(true, Ordering::Release);
    }

    /// 发送一条已序列化的文本帧
    ///
    /// 不等待网络，只写入发送缓冲。
    pub fn send(&self, text: Arc<str>) -> SendOutcome {
        if !self.alive.load(Ordering::Acquire) {
            return SendOutcome::Gone;
        }
        match self.tx.try_send(text) {
            Ok(()) => SendOutcome::Delivered,
            Err(TrySendError::Full(_)) => SendOutcome::Dropped,
            Err(TrySendError::Closed(_)) => {
                self.close();
                SendOutcome::Gone
            }
        }
    }

    /// 序列化并发送协议消息
    pub fn send_message(&self, msg: &ServerMessage) -> SendOutcome {
        match serde_json::to_string(msg) {
            Ok(json) => self.send(Arc::from(json)),
            Err(e) => {
                tracing::error!(conn_id = %self.id, error = %e, "Failed to serialize message");
                SendOutcome::Dropped
            }
        }
    }
}

/// 连接注册表
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记新连接
    pub fn register(&self, handle: Arc<ConnectionHandle>) {
        tracing::debug!(
            conn_id = %handle.id,
            peer = ?handle.peer(),
            role = ?handle.role(),
            "Connection registered"
        );
        self.connections.insert(handle.id, handle);
    }

    /// 移除连接 (幂等)
    ///
    /// close 与 error 事件可能竞争，重复移除是空操作。
    /// 返回是否真的移除了条目。
    pub fn unregister(&self, id: ConnectionId) -> bool {
        match self.connections.remove(&id) {
            Some((_, handle)) => {
                handle.close();
                tracing::debug!(
                    conn_id = %id,
                    peer = ?handle.peer(),
                    uptime_ms = handle.uptime().as_millis() as u64,
                    "Connection unregistered"
                );
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.connections.get(&id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    /// 将连接提升为管理员
    pub fn mark_admin(&self, id: ConnectionId) -> bool {
        match self.connections.get(&id) {
            Some(entry) => {
                entry.value().promote();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn ids(&self) -> Vec<ConnectionId> {
        self.connections.iter().map(|entry| *entry.key()).collect()
    }

    /// 所有非管理员连接
    pub fn participants(&self) -> Vec<Arc<ConnectionHandle>> {
        self.connections
            .iter()
            .filter(|entry| !entry.value().is_admin())
            .map(|entry| entry.value().clone())
            .collect()
    }
}
