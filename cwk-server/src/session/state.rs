//! 会话状态 (SessionState)
//!
//! 每个服务器实例一份，由 [`Session`] 持有，通过 `Arc<Session>` 注入
//! 到需要它的组件。状态记录整体替换 (copy-on-write)，读取方拿到的
//! 快照永远是完整一致的。

use std::sync::Arc;

use parking_lot::RwLock;
use shared::workshop::AdminConfig;

use super::registry::ConnectionRegistry;

/// 会话状态快照
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// 管理员开关
    pub admin_config: AdminConfig,
    /// 讲师最近一次访问的页面
    pub previous_url: Option<String>,
}

impl SessionState {
    pub fn new(admin_config: AdminConfig) -> Self {
        Self {
            admin_config,
            previous_url: None,
        }
    }
}

/// 会话生命周期对象
///
/// 持有状态快照和连接注册表，随服务器实例创建和销毁，不持久化。
#[derive(Debug, Default)]
pub struct Session {
    state: RwLock<Arc<SessionState>>,
    registry: ConnectionRegistry,
}

impl Session {
    pub fn new(initial: SessionState) -> Self {
        Self {
            state: RwLock::new(Arc::new(initial)),
            registry: ConnectionRegistry::new(),
        }
    }

    /// 读取当前快照
    pub fn get_state(&self) -> Arc<SessionState> {
        self.state.read().clone()
    }

    /// 整体替换状态
    pub fn set_state(&self, next: SessionState) {
        *self.state.write() = Arc::new(next);
    }

    /// 复制当前快照、修改副本、换入
    ///
    /// 写锁覆盖读-改-换整个过程，并发更新不会丢失。
    pub fn update<F>(&self, f: F) -> Arc<SessionState>
    where
        F: FnOnce(&mut SessionState),
    {
        let mut guard = self.state.write();
        let mut next = SessionState::clone(&guard);
        f(&mut next);
        let next = Arc::new(next);
        *guard = next.clone();
        next
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::workshop::ToggleKey;

    #[test]
    fn snapshots_are_not_mutated_in_place() {
        let session = Session::new(SessionState::default());
        let before = session.get_state();

        session.update(|state| {
            state.admin_config = state.admin_config.with(ToggleKey::FollowMode, true);
            state.previous_url = Some("/exercise/1".into());
        });

        assert!(!before.admin_config.follow_mode);
        assert_eq!(before.previous_url, None);

        let after = session.get_state();
        assert!(after.admin_config.follow_mode);
        assert_eq!(after.previous_url.as_deref(), Some("/exercise/1"));
    }

    #[test]
    fn set_state_replaces_whole_record() {
        let session = Session::new(SessionState::new(AdminConfig {
            enable_caching: true,
            follow_mode: true,
        }));

        session.set_state(SessionState::default());
        assert_eq!(*session.get_state(), SessionState::default());
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        let session = Arc::new(Session::default());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let session = session.clone();
                std::thread::spawn(move || {
                    for j in 0..100 {
                        session.update(|state| {
                            state.previous_url = Some(format!("/t{i}/{j}"));
                        });
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let url = session.get_state().previous_url.clone().unwrap();
        assert!(url.ends_with("/99"));
    }
}
