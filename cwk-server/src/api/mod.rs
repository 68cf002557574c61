//! 路由装配
//!
//! | 路径 | 说明 |
//! |------|------|
//! | `GET /wds` | WebSocket 广播协议 |
//! | `POST /api/login` | 管理员登录 (启用 `jwt` 中间件时) |
//! | 其他 | `rootDir` 下的静态文件 |

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::auth;
use crate::core::ServerState;
use crate::core::resolver::Middleware;
use crate::middleware::{change_participant_url, no_cache};
use crate::ws;

/// 根据解析后的配置构建路由
pub fn create_router(state: ServerState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new().route("/wds", get(ws::handle_ws));

    if config.has_middleware(Middleware::Jwt) {
        router = router.route("/api/login", post(auth::login));
    }

    let mut router = router.fallback_service(ServeDir::new(&config.root_dir));

    // 后添加的层在外侧
    if config.has_middleware(Middleware::ChangeParticipantUrl) {
        router = router.layer(middleware::from_fn_with_state(
            state.clone(),
            change_participant_url,
        ));
    }
    if config.has_middleware(Middleware::NoCache) {
        router = router.layer(middleware::from_fn_with_state(state.clone(), no_cache));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
