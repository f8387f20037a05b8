//! 日志初始化
//!
//! 库 crate 只产生 `tracing` 事件；可执行程序在启动时调用一次 [`init_logger`]。
//! 依赖库通过 `log` 输出的记录由 `tracing-log` 桥接。

use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

/// 未设置 `RUST_LOG` 时使用的过滤规则
pub const DEFAULT_FILTER: &str = "axio=info";

static INIT: OnceLock<bool> = OnceLock::new();

/// 以 [`DEFAULT_FILTER`] 安装全局 subscriber
///
/// 本次（或更早的一次）调用安装成功时返回 `true`。
pub fn init_logger() -> bool {
    init_logger_with_filter(DEFAULT_FILTER)
}

/// 安装全局 subscriber
///
/// `RUST_LOG` 未设置或无效时回退到 `default_filter`。之后的调用不做任何事。
pub fn init_logger_with_filter(default_filter: &str) -> bool {
    *INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_filter))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        // `log` 门面可能已被其他 logger 占用（例如测试框架）
        let _ = tracing_log::LogTracer::init();

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_thread_names(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber).is_ok()
    })
}
