//! 端到端流程：管理员开启跟随模式，讲师导航同步到学员

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::connect_info::MockConnectInfo,
    http::{Request, StatusCode},
    middleware,
    response::Html,
    routing::get,
};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tower::ServiceExt;

use cwk_server::core::{FsScan, RawOptions, ServerState, WorkshopConfig, resolve};
use cwk_server::middleware::change_participant_url;
use cwk_server::protocol;
use cwk_server::session::{ConnectionHandle, ConnectionId, Role};

fn server_state() -> ServerState {
    let resolved = resolve(&RawOptions::with_dir("."), FsScan::default()).unwrap();
    ServerState::new(resolved, &WorkshopConfig::default()).unwrap()
}

/// 练习页面路由 + 导航拦截，模拟指定来源地址
fn exercise_app(state: ServerState, peer: SocketAddr) -> Router {
    exercise_routes(state).layer(MockConnectInfo(peer))
}

/// 不带来源地址的练习页面路由
fn exercise_routes(state: ServerState) -> Router {
    Router::new()
        .route(
            "/exercise/{n}",
            get(|| async { Html("<h1>Exercise</h1>") }),
        )
        .route("/exercise/{n}/style.css", get(|| async { "body {}" }))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            change_participant_url,
        ))
        .with_state(state)
}

fn connect(state: &ServerState, role: Role) -> (ConnectionId, mpsc::Receiver<Arc<str>>) {
    let (handle, rx) = ConnectionHandle::channel(role, None);
    let id = handle.id;
    state.session().registry().register(Arc::new(handle));
    (id, rx)
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn enable_follow_mode(state: &ServerState, admin: ConnectionId) {
    protocol::handle_text(
        state.session(),
        admin,
        &json!({
            "type": "config-updated",
            "key": "followMode",
            "config": { "enableCaching": false, "followMode": true },
            "byAdmin": "instructor"
        })
        .to_string(),
    );
}

fn loopback() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 50000))
}

#[tokio::test]
async fn instructor_navigation_reaches_participants() {
    let state = server_state();
    let (_p1, mut p1_rx) = connect(&state, Role::Participant);
    let (_p2, mut p2_rx) = connect(&state, Role::Participant);
    let (admin, mut admin_rx) = connect(&state, Role::Admin);

    enable_follow_mode(&state, admin);
    assert!(state.session().get_state().admin_config.follow_mode);

    let response = exercise_app(state.clone(), loopback())
        .oneshot(get_request("/exercise/2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let expected = json!({ "type": "update-url", "data": "/exercise/2" });
    for rx in [&mut p1_rx, &mut p2_rx] {
        let frame: Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(frame, expected);
    }
    assert!(admin_rx.try_recv().is_err());
    assert_eq!(
        state.session().get_state().previous_url.as_deref(),
        Some("/exercise/2")
    );
}

#[tokio::test]
async fn remote_navigation_is_recorded_but_not_broadcast() {
    let state = server_state();
    let (_p, mut p_rx) = connect(&state, Role::Participant);
    let (admin, _admin_rx) = connect(&state, Role::Admin);
    enable_follow_mode(&state, admin);

    let remote = SocketAddr::from(([192, 168, 0, 42], 50000));
    exercise_app(state.clone(), remote)
        .oneshot(get_request("/exercise/3"))
        .await
        .unwrap();

    assert!(p_rx.try_recv().is_err());
    assert_eq!(
        state.session().get_state().previous_url.as_deref(),
        Some("/exercise/3")
    );
}

#[tokio::test]
async fn navigation_without_peer_address_is_not_broadcast() {
    let state = server_state();
    let (_p, mut p_rx) = connect(&state, Role::Participant);
    let (admin, _admin_rx) = connect(&state, Role::Admin);
    enable_follow_mode(&state, admin);

    let response = exercise_routes(state.clone())
        .oneshot(get_request("/exercise/5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert!(p_rx.try_recv().is_err());
    assert_eq!(
        state.session().get_state().previous_url.as_deref(),
        Some("/exercise/5")
    );
}

#[tokio::test]
async fn assets_and_iframe_requests_are_ignored() {
    let state = server_state();
    let (_p, mut p_rx) = connect(&state, Role::Participant);
    let (admin, _admin_rx) = connect(&state, Role::Admin);
    enable_follow_mode(&state, admin);

    let app = exercise_app(state.clone(), loopback());

    let response = app
        .clone()
        .oneshot(get_request("/exercise/1/style.css"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    app.oneshot(
        Request::builder()
            .uri("/exercise/1")
            .header("sec-fetch-dest", "iframe")
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    assert!(p_rx.try_recv().is_err());
    assert_eq!(state.session().get_state().previous_url, None);
}

#[tokio::test]
async fn disconnected_participant_is_skipped() {
    let state = server_state();
    let (gone, mut gone_rx) = connect(&state, Role::Participant);
    let (_stay, mut stay_rx) = connect(&state, Role::Participant);
    let (admin, _admin_rx) = connect(&state, Role::Admin);
    enable_follow_mode(&state, admin);

    assert!(state.session().registry().unregister(gone));
    assert!(!state.session().registry().unregister(gone));

    exercise_app(state.clone(), loopback())
        .oneshot(get_request("/exercise/4"))
        .await
        .unwrap();

    assert!(gone_rx.try_recv().is_err());
    let frame: Value = serde_json::from_str(&stay_rx.try_recv().unwrap()).unwrap();
    assert_eq!(frame["data"], "/exercise/4");
}

#[tokio::test]
async fn admin_sidebar_reads_current_config() {
    let state = server_state();
    let (admin, mut admin_rx) = connect(&state, Role::Admin);
    enable_follow_mode(&state, admin);

    protocol::handle_text(state.session(), admin, r#"{"type":"config-init"}"#);

    let frame: Value = serde_json::from_str(&admin_rx.try_recv().unwrap()).unwrap();
    assert_eq!(
        frame,
        json!({
            "type": "config-init",
            "config": { "enableCaching": false, "followMode": true }
        })
    );
}
