//! 启动选项 (RawOptions)
//!
//! 调用方传入的原始启动选项，尚未应用模式锁定和默认值。
//! 只接受已识别的键，未知键视为配置错误。

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::error::ConfigError;

/// 已识别的启动选项键 (JSON camelCase)
pub const RECOGNIZED_OPTIONS: [&str; 14] = [
    "mode",
    "watch",
    "eventStream",
    "compatibility",
    "withoutAppShell",
    "enableCaching",
    "alwaysServeFiles",
    "title",
    "participantIndexHtmlExists",
    "port",
    "rootDir",
    "dir",
    "logStartup",
    "open",
];

/// 练习页面的嵌入方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// 练习通过 iframe 嵌入 app shell (与热重载、事件流不兼容)
    #[default]
    Iframe,
    /// 练习作为 ES module 直接加载
    Module,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Iframe => "iframe",
            Mode::Module => "module",
        }
    }
}

/// 浏览器兼容转换级别 (交给 serving engine)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compatibility {
    Auto,
    Always,
    Min,
    Max,
    #[serde(rename = "none")]
    Disabled,
}

/// 原始启动选项
///
/// 所有字段可选，`dir` 除外 (在解析阶段校验)。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawOptions {
    pub mode: Option<Mode>,
    pub watch: Option<bool>,
    pub event_stream: Option<bool>,
    pub compatibility: Option<Compatibility>,
    pub without_app_shell: Option<bool>,
    pub enable_caching: Option<bool>,
    pub always_serve_files: Option<bool>,
    pub title: Option<String>,
    pub participant_index_html_exists: Option<bool>,
    pub port: Option<u16>,
    pub root_dir: Option<PathBuf>,
    pub dir: Option<PathBuf>,
    pub log_startup: Option<bool>,
    pub open: Option<bool>,
}

impl RawOptions {
    /// 只指定练习目录的选项
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            ..Default::default()
        }
    }

    /// 从 JSON 值解析
    ///
    /// 先检查未知键，再做类型校验，保证未知键得到明确的错误。
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let Value::Object(map) = &value else {
            return Err(ConfigError::Invalid(
                "start-up options must be a JSON object".to_string(),
            ));
        };

        if let Some(key) = map
            .keys()
            .find(|k| !RECOGNIZED_OPTIONS.contains(&k.as_str()))
        {
            return Err(ConfigError::UnknownOption(key.clone()));
        }

        serde_json::from_value(value).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// 从 JSON 文本解析
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Self::from_value(value)
    }

    /// 从 JSON 文件加载
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }
}
