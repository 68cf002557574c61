//! 管理员认证
//!
//! - [`jwt`] - HS256 令牌签发与校验
//! - [`login`] - `POST /api/login` 处理器

pub mod jwt;
pub mod login;

pub use jwt::{Claims, JwtError, JwtService};
pub use login::{ADMIN_PASSWORD_HEADER, AdminGate, LoginResponse, USER_HEADER, login};
