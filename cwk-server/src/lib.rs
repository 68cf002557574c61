//! Workshop 开发服务器
//!
//! # 架构概述
//!
//! 讲师与学员共用一个本地开发服务器，提供以下核心功能：
//!
//! - **配置解析** (`core::resolver`): 启动选项 → 锁定后的服务器配置
//! - **会话** (`session`): 管理员开关、讲师最近页面、存活连接
//! - **广播协议** (`protocol`): `config-init` / `config-updated` / `update-url`
//! - **导航拦截** (`middleware`): 跟随模式下讲师导航同步到学员
//! - **管理员认证** (`auth`): 密码登录 + HS256 JWT
//!
//! # 模块结构
//!
//! ```text
//! cwk-server/src/
//! ├── core/          # 启动选项、配置、状态、错误、服务器
//! ├── session/       # 会话状态与连接注册表
//! ├── protocol/      # 消息处理与广播
//! ├── middleware/    # no-cache、导航拦截
//! ├── auth/          # JWT、登录
//! ├── ws/            # WebSocket 端点
//! ├── api/           # 路由装配
//! └── utils/         # 日志
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod middleware;
pub mod protocol;
pub mod session;
pub mod utils;
pub mod ws;

// Re-export 公共类型
pub use api::create_router;
pub use auth::{AdminGate, JwtService};
pub use crate::core::{
    Config, ConfigError, FsScan, Mode, RawOptions, ResolvedServerConfig, Server, ServerError,
    ServerState, WorkshopConfig, resolve,
};
pub use session::{Session, SessionState};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger_with_file};

/// 加载 `.env`、读取运行环境配置并初始化日志
pub fn setup_environment() -> anyhow::Result<Config> {
    let _ = dotenv::dotenv();
    let config = Config::from_env();
    init_logger_with_file(&config.log_level, config.log_json, config.log_dir.as_deref())?;
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
   ______         __
  / ____/      __/ /__
 / /   | | /| / / //_/
/ /___ | |/ |/ / ,<
\____/ |__/|__/_/|_|
    "#
    );
}
