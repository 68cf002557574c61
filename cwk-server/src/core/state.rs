use std::sync::Arc;

use shared::workshop::AdminConfig;

use crate::auth::AdminGate;
use crate::core::error::ConfigError;
use crate::core::resolver::ResolvedServerConfig;
use crate::core::workshop::WorkshopConfig;
use crate::session::{Session, SessionState};

/// 服务器状态 - 所有处理器共享
///
/// 使用 Arc 实现浅拷贝，每个请求克隆一次。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Arc<ResolvedServerConfig> | 解析后的启动配置 (不可变) |
/// | session | Arc<Session> | 会话状态与连接注册表 |
/// | admin_gate | Option<Arc<AdminGate>> | 管理员登录，未配置密码时为 None |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Arc<ResolvedServerConfig>,
    pub session: Arc<Session>,
    pub admin_gate: Option<Arc<AdminGate>>,
}

impl ServerState {
    /// 创建服务器状态
    ///
    /// 会话的 `enableCaching` 初始值取自启动配置，`followMode` 初始关闭。
    /// 启动选项未设置标题时使用 workshop 文件中的标题。
    pub fn new(
        mut config: ResolvedServerConfig,
        workshop: &WorkshopConfig,
    ) -> Result<Self, ConfigError> {
        if config.title.is_empty()
            && let Some(title) = &workshop.title
        {
            config.title = title.clone();
        }

        let admin_gate = AdminGate::from_workshop(workshop)?.map(Arc::new);
        let session = Session::new(SessionState::new(AdminConfig {
            enable_caching: config.enable_caching,
            follow_mode: false,
        }));

        Ok(Self {
            config: Arc::new(config),
            session: Arc::new(session),
            admin_gate,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn config(&self) -> &ResolvedServerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::RawOptions;
    use crate::core::resolver::{FsScan, resolve};

    fn resolved(raw: RawOptions) -> ResolvedServerConfig {
        resolve(&raw, FsScan::default()).unwrap()
    }

    #[test]
    fn session_seeded_from_resolved_config() {
        let raw = RawOptions {
            enable_caching: Some(true),
            ..RawOptions::with_dir(".")
        };
        let state = ServerState::new(resolved(raw), &WorkshopConfig::default()).unwrap();

        let snapshot = state.session().get_state();
        assert!(snapshot.admin_config.enable_caching);
        assert!(!snapshot.admin_config.follow_mode);
        assert_eq!(snapshot.previous_url, None);
        assert!(state.admin_gate.is_none());
    }

    #[test]
    fn workshop_title_fills_empty_title() {
        let workshop = WorkshopConfig {
            title: Some("Web Components".into()),
            ..WorkshopConfig::default()
        };
        let state = ServerState::new(resolved(RawOptions::with_dir(".")), &workshop).unwrap();
        assert_eq!(state.config().title, "Web Components");

        let raw = RawOptions {
            title: Some("From options".into()),
            ..RawOptions::with_dir(".")
        };
        let state = ServerState::new(resolved(raw), &workshop).unwrap();
        assert_eq!(state.config().title, "From options");
    }

    #[test]
    fn admin_password_without_key_fails() {
        let workshop = WorkshopConfig {
            admin_password: Some("pw".into()),
            ..WorkshopConfig::default()
        };
        assert!(matches!(
            ServerState::new(resolved(RawOptions::with_dir(".")), &workshop),
            Err(ConfigError::MissingSigningSecret)
        ));
    }

    #[test]
    fn clones_share_the_session() {
        let state =
            ServerState::new(resolved(RawOptions::with_dir(".")), &WorkshopConfig::default())
                .unwrap();
        let clone = state.clone();
        clone.session().update(|s| s.previous_url = Some("/x".into()));
        assert_eq!(state.session().get_state().previous_url.as_deref(), Some("/x"));
    }
}
