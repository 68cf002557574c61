//! HTTP 中间件
//!
//! 按解析结果中的 [`Middleware`](crate::core::resolver::Middleware) 列表装配：
//!
//! | 中间件 | 作用 |
//! |--------|------|
//! | `no-cache` | 添加禁止缓存的响应头 |
//! | `change-participant-url` | 讲师导航同步到学员 |
//! | `jwt` | `POST /api/login` 管理员登录 |

pub mod navigation;
pub mod no_cache;

pub use navigation::{change_participant_url, is_instructor_addr, record_navigation};
pub use no_cache::no_cache;
