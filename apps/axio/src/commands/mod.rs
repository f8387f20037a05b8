//! 命令定义和实现

pub mod config;
pub mod probe;
pub mod run;

pub use config::ConfigCommand;
pub use run::RunCommand;

use crate::config::AxioConfig;
use axio_sdk::driver::{CommandLink, LinkBuilder};
use axio_sdk::link::MockLink;
use tracing::info;

/// 按配置打开链路
///
/// 打开失败不是致命错误：返回一个不可用链路，其余功能照常运行。
pub fn open_link(config: &AxioConfig, dry_run: bool) -> CommandLink {
    let link = &config.link;
    let builder = LinkBuilder::new()
        .port(link.port.as_str())
        .baud_rate(link.baud)
        .read_timeout(link.read_timeout())
        .link_config(link.handshake.clone());

    if dry_run {
        info!("Dry run: using an in-memory device instead of {}", link.port);
        let device = MockLink::with_firmware_acks();
        return match builder
            .settle(std::time::Duration::ZERO)
            .build_with_adapter(device)
        {
            Ok(link) => link,
            Err(e) => {
                tracing::error!("Mock device failed: {}", e);
                CommandLink::unavailable(config.link.handshake.clone())
            },
        };
    }

    builder.settle(link.open_settle()).build_or_unavailable()
}
