//! Workshop 文件 (`<dir>/cwk.config.json`)
//!
//! 由讲师维护，包含管理员密码和令牌签名密钥。文件不存在时视为未配置管理员。

use std::path::Path;

use serde::Deserialize;

use crate::core::error::ConfigError;

/// workshop 文件名
pub const WORKSHOP_FILE: &str = "cwk.config.json";

#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopConfig {
    pub admin_password: Option<String>,
    pub app_key: Option<String>,
    pub title: Option<String>,
}

impl std::fmt::Debug for WorkshopConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkshopConfig")
            .field("admin_password", &self.admin_password.as_ref().map(|_| "***"))
            .field("app_key", &self.app_key.as_ref().map(|_| "***"))
            .field("title", &self.title)
            .finish()
    }
}

impl WorkshopConfig {
    /// 从 workshop 目录加载
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(WORKSHOP_FILE);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No workshop file, admin login disabled");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.display().to_string(),
                    source,
                });
            }
        };

        let config: Self = serde_json::from_str(&text)
            .map_err(|e| ConfigError::Invalid(format!("{}: {}", WORKSHOP_FILE, e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 有管理员密码时必须有签名密钥
    pub fn validate(&self) -> Result<(), ConfigError> {
        let has_password = self.admin_password.as_deref().is_some_and(|p| !p.is_empty());
        let has_key = self.app_key.as_deref().is_some_and(|k| !k.is_empty());
        if has_password && !has_key {
            return Err(ConfigError::MissingSigningSecret);
        }
        Ok(())
    }
}
