//! 配置解析 (ConfigResolver)
//!
//! 将 [`RawOptions`] 解析为锁定后的 [`ResolvedServerConfig`]。
//! 纯函数，无 I/O；文件系统探测由调用方通过 [`FsScan`] 传入。
//!
//! # 优先级 (高 → 低)
//!
//! 1. 模式锁定：iframe 模式强制关闭 watch / eventStream；
//!    compatibility 在任何模式下都不转交给 serving engine
//! 2. 功能开关 → 插件 / 中间件成员
//! 3. 默认值

use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::error::ConfigError;
use crate::core::options::{Compatibility, Mode, RawOptions};

/// 默认 HTTP 端口
pub const DEFAULT_PORT: u16 = 8000;

/// Serving engine 插件标识
///
/// 插件实现属于外部 serving engine，这里只决定启用哪些。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Plugin {
    /// 替换 `%websocketport%` 占位符
    WebSocketPort,
    /// 在讲师页面注入管理员侧边栏
    AdminSidebar,
    /// 在学员页面注入跟随模式脚本
    FollowMode,
    /// 为学员分配身份 cookie
    ParticipantCookie,
    /// 生成练习索引
    ExerciseIndex,
    /// 注入 app shell
    AppShell,
    /// 按学员进度控制文件是否可访问
    FileControl,
    /// iframe 嵌入模式支持
    IframeMode,
    /// 裸模块导入解析
    NodeResolve,
    /// 练习文件 MIME 修正
    MimeTypes,
}

impl Plugin {
    pub fn name(&self) -> &'static str {
        match self {
            Plugin::WebSocketPort => "websocket-port",
            Plugin::AdminSidebar => "admin-sidebar",
            Plugin::FollowMode => "follow-mode",
            Plugin::ParticipantCookie => "participant-cookie",
            Plugin::ExerciseIndex => "exercise-index",
            Plugin::AppShell => "app-shell",
            Plugin::FileControl => "file-control",
            Plugin::IframeMode => "iframe-mode",
            Plugin::NodeResolve => "node-resolve",
            Plugin::MimeTypes => "mime-types",
        }
    }
}

impl fmt::Display for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 本服务自带的 HTTP 中间件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Middleware {
    /// 禁止浏览器缓存
    NoCache,
    /// 跟随模式导航拦截
    ChangeParticipantUrl,
    /// 管理员登录 (`POST /api/login`)
    Jwt,
}

impl Middleware {
    pub fn name(&self) -> &'static str {
        match self {
            Middleware::NoCache => "no-cache",
            Middleware::ChangeParticipantUrl => "change-participant-url",
            Middleware::Jwt => "jwt",
        }
    }
}

impl fmt::Display for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 调用方完成的文件系统探测结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FsScan {
    pub participant_index_html_exists: bool,
}

impl FsScan {
    /// 检查练习目录下是否有学员 index.html
    pub fn scan(dir: &Path) -> Self {
        Self {
            participant_index_html_exists: dir.join("index.html").is_file(),
        }
    }
}

/// 锁定后的服务器配置，启动后不可变
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedServerConfig {
    pub mode: Mode,
    pub watch: bool,
    pub event_stream: bool,
    /// 调用方传入的值不会转交，始终为 `None`
    pub compatibility: Option<Compatibility>,
    pub without_app_shell: bool,
    pub enable_caching: bool,
    pub always_serve_files: bool,
    pub title: String,
    pub participant_index_html_exists: bool,
    pub port: u16,
    pub dir: PathBuf,
    pub root_dir: PathBuf,
    pub log_startup: bool,
    pub open: bool,
    /// 启用的插件 (有序)
    pub plugins: Vec<Plugin>,
    /// 启用的中间件 (有序，外层在前)
    pub middlewares: Vec<Middleware>,
}

impl ResolvedServerConfig {
    pub fn has_plugin(&self, plugin: Plugin) -> bool {
        self.plugins.contains(&plugin)
    }

    pub fn has_middleware(&self, middleware: Middleware) -> bool {
        self.middlewares.contains(&middleware)
    }
}

/// 解析启动选项
///
/// # 错误
///
/// - 缺少 `dir` 返回 [`ConfigError::MissingOption`]
///
/// 被模式锁定覆盖的冲突设置不是错误，直接钳制。
pub fn resolve(raw: &RawOptions, scan: FsScan) -> Result<ResolvedServerConfig, ConfigError> {
    let dir = raw.dir.clone().ok_or(ConfigError::MissingOption("dir"))?;
    let mode = raw.mode.unwrap_or_default();

    let (watch, event_stream) = match mode {
        Mode::Iframe => (false, false),
        Mode::Module => {
            let watch = raw.watch.unwrap_or(false);
            (watch, raw.event_stream.unwrap_or(watch))
        }
    };
    // 接受但不生效，serving engine 使用自身默认值
    let compatibility = None;

    let without_app_shell = raw.without_app_shell.unwrap_or(false);
    let enable_caching = raw.enable_caching.unwrap_or(false);
    let always_serve_files = raw.always_serve_files.unwrap_or(false);

    let mut plugins = vec![
        Plugin::WebSocketPort,
        Plugin::AdminSidebar,
        Plugin::FollowMode,
        Plugin::ParticipantCookie,
        Plugin::ExerciseIndex,
    ];
    if !without_app_shell {
        plugins.push(Plugin::AppShell);
    }
    if !always_serve_files {
        plugins.push(Plugin::FileControl);
    }
    if mode == Mode::Iframe {
        plugins.push(Plugin::IframeMode);
    }
    plugins.extend([Plugin::NodeResolve, Plugin::MimeTypes]);

    let mut middlewares = Vec::with_capacity(3);
    if !enable_caching {
        middlewares.push(Middleware::NoCache);
    }
    middlewares.extend([Middleware::ChangeParticipantUrl, Middleware::Jwt]);

    Ok(ResolvedServerConfig {
        mode,
        watch,
        event_stream,
        compatibility,
        without_app_shell,
        enable_caching,
        always_serve_files,
        title: raw.title.clone().unwrap_or_default(),
        participant_index_html_exists: raw
            .participant_index_html_exists
            .unwrap_or(scan.participant_index_html_exists),
        port: raw.port.unwrap_or(DEFAULT_PORT),
        root_dir: raw.root_dir.clone().unwrap_or_else(|| dir.clone()),
        dir,
        log_startup: raw.log_startup.unwrap_or(true),
        open: raw.open.unwrap_or(false),
        plugins,
        middlewares,
    })
}
