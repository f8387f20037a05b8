//! # Axio Link Adapter Layer
//!
//! 执行器字节流的硬件抽象层。上层只看到"写一行 / 取一行 / 清空输入"三个动作，
//! 具体是 USB 串口还是内存 Mock 由适配器决定。

use thiserror::Error;

pub use axio_protocol::{Command, LineDecoder};

#[cfg(feature = "serial")]
pub mod serial;

#[cfg(feature = "serial")]
pub use serial::SerialLink;

#[cfg(feature = "mock")]
pub mod mock;

#[cfg(feature = "mock")]
pub use mock::MockLink;

/// 链路层统一错误类型
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serial")]
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("Failed to open {port}: {message}")]
    Open { port: String, message: String },

    #[error("Link closed")]
    Closed,
}

impl LinkError {
    /// 超时类 IO 错误（读不到数据是正常情况，不应使链路降级）
    pub fn is_timeout(&self) -> bool {
        match self {
            LinkError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }
}

/// 点对点字节流适配器
///
/// 实现者只负责搬运字节，不关心命令语义，也不做任何加锁：
/// 写入的互斥由上层的 `CommandLink` 统一保证。
pub trait LinkAdapter {
    /// 写入完整的字节序列（通常是一条已编码的命令行）
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), LinkError>;

    /// 非阻塞地取出一条完整的上行行
    ///
    /// 没有完整行时返回 `Ok(None)`。
    fn poll_line(&mut self) -> Result<Option<String>, LinkError>;

    /// 丢弃尚未读取的上行数据
    fn clear_input(&mut self) -> Result<(), LinkError> {
        Ok(())
    }

    /// 设备名称（用于日志）
    fn name(&self) -> &str {
        "link"
    }
}

impl<T: LinkAdapter + ?Sized> LinkAdapter for Box<T> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        (**self).write_all(bytes)
    }

    fn poll_line(&mut self) -> Result<Option<String>, LinkError> {
        (**self).poll_line()
    }

    fn clear_input(&mut self) -> Result<(), LinkError> {
        (**self).clear_input()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
