//! 核心模块 - 配置、状态和服务器
//!
//! - [`options`] / [`resolver`] - 启动选项解析
//! - [`config`] - 运行环境配置
//! - [`workshop`] - workshop 文件
//! - [`state`] - 共享状态
//! - [`server`] - HTTP 服务器

pub mod config;
pub mod error;
pub mod options;
pub mod resolver;
pub mod server;
pub mod state;
pub mod workshop;

pub use config::Config;
pub use error::{ConfigError, Result, ServerError};
pub use options::{Compatibility, Mode, RawOptions};
pub use resolver::{FsScan, Middleware, Plugin, ResolvedServerConfig, resolve};
pub use server::Server;
pub use state::ServerState;
pub use workshop::WorkshopConfig;
