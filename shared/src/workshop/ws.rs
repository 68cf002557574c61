//! Workshop WebSocket protocol
//!
//! Browser → Server: ClientMessage (管理员侧边栏发出)
//! Server → Browser: ServerMessage (配置回执 / 跟随模式导航)
//!
//! 所有帧均为 JSON 文本，信封格式 `{"type": "...", ...payload}`。

use serde::{Deserialize, Serialize};

use super::admin::AdminConfig;

/// 已识别的消息类型
pub const CONFIG_INIT: &str = "config-init";
pub const CONFIG_UPDATED: &str = "config-updated";
pub const UPDATE_URL: &str = "update-url";

/// Browser → Server 消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// 侧边栏连接建立后请求当前配置
    #[serde(rename = "config-init")]
    ConfigInit,

    /// 侧边栏切换了某个开关
    #[serde(rename = "config-updated", rename_all = "camelCase")]
    ConfigUpdated {
        /// 侧边栏本地的完整配置
        config: AdminConfig,
        /// 被切换的开关名 (由服务端校验)
        key: String,
        /// 发起者的学员 cookie
        #[serde(default, skip_serializing_if = "Option::is_none")]
        by_admin: Option<String>,
    },
}

impl ClientMessage {
    pub fn type_name(&self) -> &'static str {
        match self {
            ClientMessage::ConfigInit => CONFIG_INIT,
            ClientMessage::ConfigUpdated { .. } => CONFIG_UPDATED,
        }
    }
}

/// Server → Browser 消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// 回复 config-init，仅发给请求方
    #[serde(rename = "config-init")]
    ConfigInit { config: AdminConfig },

    /// 讲师导航到新页面，学员跟随
    #[serde(rename = "update-url")]
    UpdateUrl { data: String },
}

impl ServerMessage {
    pub fn type_name(&self) -> &'static str {
        match self {
            ServerMessage::ConfigInit { .. } => CONFIG_INIT,
            ServerMessage::UpdateUrl { .. } => UPDATE_URL,
        }
    }
}
