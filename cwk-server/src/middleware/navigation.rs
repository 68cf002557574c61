//! 导航拦截 (change-participant-url)
//!
//! ```text
//! 讲师浏览器 ──GET /exercise/2──▶ 静态文件 ──200 text/html──▶ 讲师浏览器
//!                                         │
//!                    followMode 开启 + 本机请求
//!                                         ▼
//!                         update-url ──▶ 所有学员连接
//! ```
//!
//! 只处理整页导航：iframe 内的子请求 (`sec-fetch-dest: iframe`) 和
//! 非 200 / 非 HTML 响应原样放行。

use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::Response,
};

use crate::core::ServerState;
use crate::protocol::{BroadcastReport, broadcast_url};
use crate::session::Session;

pub const FETCH_DEST_HEADER: &str = "sec-fetch-dest";

/// 导航拦截中间件
pub async fn change_participant_url(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Response {
    if is_iframe_request(request.headers()) {
        return next.run(request).await;
    }

    let url = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let (mut parts, body) = request.into_parts();
    let peer = ConnectInfo::<SocketAddr>::from_request_parts(&mut parts, &state)
        .await
        .ok()
        .map(|ConnectInfo(addr)| addr.ip());
    let request = Request::from_parts(parts, body);

    let response = next.run(request).await;

    if is_page_response(&response) {
        record_navigation(state.session(), &url, peer);
    }
    response
}

/// 记录一次页面导航，讲师跟随模式下推送给学员
///
/// 推送只在请求来自本机、`followMode` 开启且有存活连接时发生；
/// `previousUrl` 每次都会更新。
pub fn record_navigation(
    session: &Session,
    url: &str,
    peer: Option<IpAddr>,
) -> Option<BroadcastReport> {
    let state = session.get_state();
    let from_instructor = peer.is_some_and(is_instructor_addr);

    let report = (from_instructor
        && state.admin_config.follow_mode
        && !session.registry().is_empty())
    .then(|| broadcast_url(session, url));

    session.update(|s| s.previous_url = Some(url.to_string()));
    report
}

/// 讲师在运行服务器的机器上浏览，请求来自回环地址
pub fn is_instructor_addr(ip: IpAddr) -> bool {
    ip.to_canonical().is_loopback()
}

fn is_iframe_request(headers: &HeaderMap) -> bool {
    headers
        .get(FETCH_DEST_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("iframe"))
}

fn is_page_response(response: &Response) -> bool {
    response.status() == StatusCode::OK
        && response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("text/html"))
}
