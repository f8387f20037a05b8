//! Builder 模式实现
//!
//! 提供链式构造 [`CommandLink`] 的便捷方式，并在打开后执行固定的上电序列：
//! 等待控制器复位 → 清空输入缓冲 → 发送 `SLEEP` 使眼球进入静止姿态。

use crate::error::DriverError;
use crate::link::{CommandLink, LinkConfig};
use axio_link::LinkAdapter;
use axio_protocol::Command;
use std::time::Duration;
use tracing::info;
#[cfg(feature = "serial")]
use tracing::{error, warn};

/// 默认串口设备
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";
/// 默认波特率
pub const DEFAULT_BAUD: u32 = 9600;

/// CommandLink Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use axio_driver::{LinkBuilder, LinkConfig};
/// use std::time::Duration;
///
/// let link = LinkBuilder::new()
///     .port("/dev/ttyACM0")
///     .baud_rate(9600)
///     .settle(Duration::from_secs(2))
///     .link_config(LinkConfig::default())
///     .build_or_unavailable();
/// ```
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    port: String,
    baud_rate: u32,
    read_timeout: Duration,
    /// 打开串口后等待控制器复位的时间
    settle: Duration,
    config: LinkConfig,
}

impl LinkBuilder {
    pub fn new() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD,
            read_timeout: Duration::from_millis(200),
            settle: Duration::from_secs(2),
            config: LinkConfig::default(),
        }
    }

    /// 设置串口设备路径
    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.port = port.into();
        self
    }

    /// 设置波特率
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// 设置底层读超时
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// 设置上电等待时间
    pub fn settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// 设置链路配置
    pub fn link_config(mut self, config: LinkConfig) -> Self {
        self.config = config;
        self
    }

    /// 打开串口并执行上电序列
    #[cfg(feature = "serial")]
    pub fn build(self) -> Result<CommandLink, DriverError> {
        let adapter = axio_link::SerialLink::open(&self.port, self.baud_rate, self.read_timeout)?;
        self.build_with_adapter(adapter)
    }

    /// 使用已构造的适配器（Mock、测试桩等）执行上电序列
    pub fn build_with_adapter(
        self,
        adapter: impl LinkAdapter + Send + 'static,
    ) -> Result<CommandLink, DriverError> {
        if !self.settle.is_zero() {
            info!("Waiting {:?} for the controller to settle", self.settle);
            std::thread::sleep(self.settle);
        }

        let link = CommandLink::new(adapter, self.config);
        link.clear_input();
        if !link.send(Command::Sleep).is_delivered() {
            return Err(DriverError::LinkUnavailable);
        }
        info!("Link {} ready, eye at rest", link.name());
        Ok(link)
    }

    /// 打开失败时返回一个不可用链路，进程继续以无设备模式运行
    #[cfg(feature = "serial")]
    pub fn build_or_unavailable(self) -> CommandLink {
        let config = self.config.clone();
        let port = self.port.clone();
        match self.build() {
            Ok(link) => link,
            Err(e) => {
                error!("Could not open link {}: {}", port, e);
                warn!("Continuing without a device; all commands will be dropped");
                CommandLink::unavailable(config)
            },
        }
    }
}

impl Default for LinkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
