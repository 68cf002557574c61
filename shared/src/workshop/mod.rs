//! Workshop 实时同步协议类型
//!
//! 管理员侧边栏、学员页面与服务端共享的数据结构。

pub mod admin;
pub mod ws;

pub use admin::{AdminConfig, ToggleKey, UnknownToggleKey};
pub use ws::*;
