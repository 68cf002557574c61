//! 禁止浏览器缓存
//!
//! 讲师修改练习文件后学员刷新即可看到最新内容。
//! 管理员在侧边栏开启 `enableCaching` 后立即停止添加这些头。

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};

use crate::core::ServerState;

pub async fn no_cache(State(state): State<ServerState>, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    if state.session().get_state().admin_config.enable_caching {
        return response;
    }

    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    response
}
