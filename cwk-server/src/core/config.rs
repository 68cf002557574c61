use std::path::PathBuf;

use crate::core::error::ConfigError;
use crate::core::options::RawOptions;

/// 运行环境配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 格式日志 |
/// | LOG_DIR | - | 日志文件目录 (未设置时仅输出到控制台) |
/// | ENVIRONMENT | development | 运行环境 |
/// | HOST | 0.0.0.0 | 监听地址 |
/// | CWK_DIR | . | workshop 目录 (未提供启动选项文件时) |
/// | CWK_OPTIONS_FILE | - | 启动选项 JSON 文件 (命令行第一个参数优先) |
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
    /// 运行环境: development | production
    pub environment: String,
    pub host: String,
    pub workshop_dir: PathBuf,
    pub options_file: Option<PathBuf>,
}

impl Config {
    /// 从环境变量和命令行加载
    pub fn from_env() -> Self {
        Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            workshop_dir: std::env::var("CWK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            options_file: std::env::args()
                .nth(1)
                .or_else(|| std::env::var("CWK_OPTIONS_FILE").ok())
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        }
    }

    /// 读取启动选项
    ///
    /// 有选项文件时从文件读取，否则只设置 `dir`。
    pub fn load_options(&self) -> Result<RawOptions, ConfigError> {
        match &self.options_file {
            Some(path) => RawOptions::load(path),
            None => Ok(RawOptions::with_dir(self.workshop_dir.clone())),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
