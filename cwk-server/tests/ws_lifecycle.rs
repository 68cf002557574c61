//! 真实 socket 上的 `/wds` 连接生命周期：升级、收发、关闭后注销

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use cwk_server::core::{FsScan, RawOptions, ServerState, WorkshopConfig, resolve};
use cwk_server::create_router;
use cwk_server::protocol;
use cwk_server::session::Role;

const TIMEOUT: Duration = Duration::from_secs(5);

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// 在随机端口启动服务器，返回状态和 `/wds` 地址
async fn boot_server() -> (ServerState, String) {
    let resolved = resolve(&RawOptions::with_dir("."), FsScan::default()).unwrap();
    let state = ServerState::new(resolved, &WorkshopConfig::default()).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_router(state.clone()).into_make_service_with_connect_info::<SocketAddr>();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (state, format!("ws://{addr}/wds"))
}

async fn connect(url: &str) -> WsStream {
    let (ws, _) = timeout(TIMEOUT, connect_async(url))
        .await
        .expect("connect timed out")
        .unwrap();
    ws
}

/// 等待服务器端状态满足条件
async fn wait_until(what: &str, cond: impl Fn() -> bool) {
    timeout(TIMEOUT, async {
        while !cond() {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {what}"));
}

async fn next_json(ws: &mut WsStream) -> Value {
    loop {
        let msg = timeout(TIMEOUT, ws.next())
            .await
            .expect("read timed out")
            .expect("stream ended")
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

#[tokio::test]
async fn config_init_over_socket_then_close_unregisters() {
    let (state, url) = boot_server().await;
    let registry = state.session().registry();

    let mut ws = connect(&format!("{url}?role=admin")).await;
    wait_until("registration", || registry.len() == 1).await;

    let id = registry.ids()[0];
    let handle = registry.get(id).unwrap();
    assert_eq!(handle.role(), Role::Admin);
    assert!(handle.peer().is_some_and(|peer| peer.ip().is_loopback()));
    drop(handle);

    ws.send(Message::text(r#"{"type":"config-init"}"#))
        .await
        .unwrap();
    assert_eq!(
        next_json(&mut ws).await,
        json!({
            "type": "config-init",
            "config": { "enableCaching": false, "followMode": false }
        })
    );

    ws.close(None).await.unwrap();
    wait_until("unregistration", || registry.is_empty()).await;
}

#[tokio::test]
async fn participant_socket_receives_update_url() {
    let (state, url) = boot_server().await;
    let registry = state.session().registry();

    let mut participant = connect(&url).await;
    let mut admin = connect(&format!("{url}?role=admin")).await;
    wait_until("both connections", || registry.len() == 2).await;

    let report = protocol::broadcast_url(state.session(), "/exercise/7");
    assert_eq!(report.delivered, 1);

    assert_eq!(
        next_json(&mut participant).await,
        json!({ "type": "update-url", "data": "/exercise/7" })
    );
    // 管理员连接在超时内收不到任何文本帧
    let silent = timeout(Duration::from_millis(200), admin.next()).await;
    assert!(silent.is_err());

    drop(participant);
    wait_until("participant cleanup", || registry.len() == 1).await;
}

#[tokio::test]
async fn server_side_unregister_ends_client_stream() {
    let (state, url) = boot_server().await;
    let registry = state.session().registry();

    let mut ws = connect(&url).await;
    wait_until("registration", || registry.len() == 1).await;

    let id = registry.ids()[0];
    assert!(registry.unregister(id));

    // 服务器发送 Close 帧后流结束
    let ended = timeout(TIMEOUT, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            }
        }
    })
    .await;
    assert!(ended.is_ok());
    assert!(registry.is_empty());
}
