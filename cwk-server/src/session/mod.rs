//! 会话模块 - 共享状态与连接注册表
//!
//! - [`Session`] - 会话生命周期对象
//! - [`SessionState`] - 状态快照
//! - [`ConnectionRegistry`] - 存活连接

pub mod registry;
pub mod state;

pub use registry::{ConnectionHandle, ConnectionId, ConnectionRegistry, Role, SendOutcome};
pub use state::{Session, SessionState};
