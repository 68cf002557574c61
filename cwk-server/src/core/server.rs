//! Server Implementation
//!
//! HTTP 服务器启动和管理

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::api::create_router;
use crate::core::{Config, Result, ServerError, ServerState};

/// HTTP Server
pub struct Server {
    config: Config,
    state: ServerState,
}

impl Server {
    pub fn new(config: Config, state: ServerState) -> Self {
        Self { config, state }
    }

    /// 监听地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.config.host, self.state.config().port)
    }

    pub async fn run(&self) -> Result<()> {
        let addr = self.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Internal(anyhow::anyhow!("failed to bind {}: {}", addr, e)))?;

        if self.state.config().log_startup {
            self.log_startup_summary(&addr);
        }

        let app = create_router(self.state.clone());

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Internal(e.into()))?;

        Ok(())
    }

    fn log_startup_summary(&self, addr: &str) {
        let config = self.state.config();
        let plugins: Vec<&str> = config.plugins.iter().map(|p| p.name()).collect();
        let middlewares: Vec<&str> = config.middlewares.iter().map(|m| m.name()).collect();

        tracing::info!("🦀 Workshop server starting on http://{}", addr);
        tracing::info!(
            title = %config.title,
            mode = config.mode.as_str(),
            watch = config.watch,
            event_stream = config.event_stream,
            dir = %config.dir.display(),
            root_dir = %config.root_dir.display(),
            participant_index_html = config.participant_index_html_exists,
            "Resolved configuration"
        );
        tracing::info!(plugins = ?plugins, middlewares = ?middlewares, "Enabled plugins");
        tracing::info!(
            admin_login = self.state.admin_gate.is_some(),
            environment = %self.config.environment,
            "Admin sidebar available at http://localhost:{}/?role=admin",
            config.port
        );

        if config.open {
            tracing::info!("Open http://localhost:{}/ in your browser", config.port);
        }
    }
}
