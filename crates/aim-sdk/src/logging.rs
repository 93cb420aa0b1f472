//! 日志初始化
//!
//! 库 crate 只通过 `tracing` 宏输出日志，由应用程序安装订阅者。

use std::error::Error;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` 未设置时的过滤规则
pub const DEFAULT_LOG_FILTER: &str = "info";

/// 安装全局日志订阅者
///
/// 过滤规则取自 `RUST_LOG`，未设置时为 [`DEFAULT_LOG_FILTER`]。
/// `log` crate 的记录经 `tracing-log` 转发。
///
/// # 错误
/// 已经安装过全局订阅者或 `log` 记录器时返回错误。
pub fn try_init_logger() -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;
    Ok(())
}

/// 同 [`try_init_logger`]，重复调用时静默忽略
pub fn init_logger() {
    if let Err(e) = try_init_logger() {
        tracing::debug!("logger already initialized: {}", e);
    }
}
