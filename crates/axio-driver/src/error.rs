//! 驱动层错误类型定义

use axio_link::LinkError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 链路适配器错误
    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    /// 链路不可用（未打开或已降级）
    #[error("Link unavailable")]
    LinkUnavailable,

    /// 握手应答超时
    #[error("No {expected} acknowledgment within {timeout_ms} ms")]
    AckTimeout { expected: String, timeout_ms: u64 },

    /// 无效配置
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
