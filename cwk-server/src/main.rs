use cwk_server::{
    FsScan, Mode, Server, ServerState, WorkshopConfig, print_banner, resolve, setup_environment,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 日志)
    let config = setup_environment()?;

    // 2. 解析启动选项，配置错误立即退出
    let raw = config.load_options()?;
    let scan = raw.dir.as_deref().map(FsScan::scan).unwrap_or_default();
    let resolved = resolve(&raw, scan)?;
    if resolved.mode == Mode::Iframe && (raw.watch.is_some() || raw.event_stream.is_some()) {
        tracing::debug!(
            watch = ?raw.watch,
            event_stream = ?raw.event_stream,
            "Iframe mode ignores watch and eventStream"
        );
    }
    if raw.compatibility.is_some() {
        tracing::debug!(compatibility = ?raw.compatibility, "compatibility option is ignored");
    }
    let workshop = WorkshopConfig::load(&resolved.dir)?;

    // 3. 初始化服务器状态
    let state = ServerState::new(resolved, &workshop)?;

    if state.config().log_startup {
        print_banner();
    }

    // 4. 启动 HTTP 服务器
    let server = Server::new(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
