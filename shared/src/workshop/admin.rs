//! 管理员配置 (AdminConfig)
//!
//! 管理员侧边栏可切换的开关集合。键集合在编译期固定，
//! 协议层通过 [`ToggleKey`] 校验，未知键直接拒绝。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 可切换的管理员开关
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToggleKey {
    /// 允许浏览器缓存练习文件
    EnableCaching,
    /// 跟随模式：讲师导航同步到所有学员
    FollowMode,
}

impl ToggleKey {
    /// 全部开关，顺序与侧边栏展示一致
    pub const ALL: [ToggleKey; 2] = [ToggleKey::EnableCaching, ToggleKey::FollowMode];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToggleKey::EnableCaching => "enableCaching",
            ToggleKey::FollowMode => "followMode",
        }
    }
}

impl fmt::Display for ToggleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToggleKey {
    type Err = UnknownToggleKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToggleKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownToggleKey(s.to_string()))
    }
}

/// 未识别的开关名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownToggleKey(pub String);

impl fmt::Display for UnknownToggleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown admin toggle: {}", self.0)
    }
}

impl std::error::Error for UnknownToggleKey {}

/// 管理员配置快照
///
/// 不可变值对象：修改通过 [`AdminConfig::with`] 返回新值，
/// 由会话层整体替换。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdminConfig {
    #[serde(default)]
    pub enable_caching: bool,
    #[serde(default)]
    pub follow_mode: bool,
}

impl AdminConfig {
    pub fn get(&self, key: ToggleKey) -> bool {
        match key {
            ToggleKey::EnableCaching => self.enable_caching,
            ToggleKey::FollowMode => self.follow_mode,
        }
    }

    /// 设置单个开关，返回新配置
    #[must_use]
    pub fn with(mut self, key: ToggleKey, value: bool) -> Self {
        match key {
            ToggleKey::EnableCaching => self.enable_caching = value,
            ToggleKey::FollowMode => self.follow_mode = value,
        }
        self
    }
}
