//! 日志基础设施
//!
//! - 控制台输出：开发环境为可读格式，`LOG_JSON=true` 时为 JSON
//! - `LOG_DIR` 设置时额外写入按天滚动的文件：
//!   - `app/` 普通日志，保留 [`APP_LOG_RETENTION_DAYS`] 天
//!   - `security/` 登录等安全事件 (`target: "security"`)，永久保留

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, filter::filter_fn, fmt, prelude::*};

/// 应用日志保留天数
pub const APP_LOG_RETENTION_DAYS: i64 = 14;

const SECURITY_TARGET: &str = "security";

/// 初始化日志系统
///
/// ```no_run
/// // 开发环境 (仅控制台)
/// cwk_server::init_logger_with_file("debug", false, None)?;
///
/// // 生产环境 (控制台 + 文件)
/// cwk_server::init_logger_with_file("info", true, Some("./logs"))?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let file_layers = match log_dir {
        Some(dir) => {
            let log_dir = Path::new(dir);
            let app_dir = log_dir.join("app");
            let security_dir = log_dir.join(SECURITY_TARGET);
            fs::create_dir_all(&app_dir)?;
            fs::create_dir_all(&security_dir)?;

            let app_log = RollingFileAppender::new(Rotation::DAILY, app_dir, "app");
            let security_log =
                RollingFileAppender::new(Rotation::DAILY, security_dir, SECURITY_TARGET);

            let app_layer = file_layer(app_log, json_format)
                .with_filter(filter_fn(|meta| meta.target() != SECURITY_TARGET))
                .boxed();
            let security_layer = file_layer(security_log, json_format)
                .with_filter(filter_fn(|meta| meta.target() == SECURITY_TARGET))
                .boxed();

            if tokio::runtime::Handle::try_current().is_ok() {
                tokio::spawn(periodic_cleanup(log_dir.to_path_buf()));
            }

            Some(vec![app_layer, security_layer])
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layers)
        .try_init()?;

    Ok(())
}

fn file_layer<S>(
    appender: RollingFileAppender,
    json_format: bool,
) -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let writer = std::sync::Mutex::new(appender);
    if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(writer)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_ansi(false)
            .with_writer(writer)
            .boxed()
    }
}

/// 删除过期的 `app.YYYY-MM-DD` 日志文件，返回删除数量
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<usize> {
    let app_dir = log_dir.join("app");
    if !app_dir.exists() {
        return Ok(0);
    }

    let cutoff = Local::now().date_naive() - chrono::Duration::days(APP_LOG_RETENTION_DAYS);
    let mut removed = 0;

    for entry in fs::read_dir(app_dir)? {
        let path = entry?.path();
        let Some(date) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(log_file_date)
        else {
            continue;
        };

        if date < cutoff {
            fs::remove_file(&path)?;
            tracing::info!(file = %path.display(), "Deleted old log file");
            removed += 1;
        }
    }

    Ok(removed)
}

/// `RollingFileAppender` 的文件名格式为 `app.2026-01-31`
fn log_file_date(name: &str) -> Option<NaiveDate> {
    let date = name.strip_prefix("app.")?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// 每小时清理一次
async fn periodic_cleanup(log_dir: PathBuf) {
    use tokio::time::{Duration, sleep};

    loop {
        sleep(Duration::from_secs(3600)).await;

        if let Err(e) = cleanup_old_logs(&log_dir) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}

/// 安全事件日志 - 写入永久保留的 `security/` 目录
///
/// ```no_run
/// cwk_server::security_log!(WARN, "admin_login_failed", user = "instructor");
/// cwk_server::security_log!(INFO, "admin_login", user = "instructor");
/// ```
#[macro_export]
macro_rules! security_log {
    (WARN, $event:expr, $($arg:tt)*) => {
        tracing::warn!(
            target: "security",
            event = $event,
            timestamp = chrono::Local::now().to_rfc3339(),
            level = "WARN",
            $($arg)*
        );
    };
    (ERROR, $event:expr, $($arg:tt)*) => {
        tracing::error!(
            target: "security",
            event = $event,
            timestamp = chrono::Local::now().to_rfc3339(),
            level = "ERROR",
            $($arg)*
        );
    };
    (INFO, $event:expr, $($arg:tt)*) => {
        tracing::info!(
            target: "security",
            event = $event,
            timestamp = chrono::Local::now().to_rfc3339(),
            level = "INFO",
            $($arg)*
        );
    };
}
