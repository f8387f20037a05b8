//! Axio SDK - 动画眼球控制核心
//!
//! # 架构设计
//!
//! 本 SDK 采用分层架构，从底层到高层：
//!
//! - **协议层** (`protocol`): 行协议命令编码、应答匹配、入站行解码
//! - **链路层** (`link`): 字节流抽象，串口适配器与 Mock 适配器
//! - **驱动层** (`driver`): 命令链路（单锁串行化）、设备状态、眨眼调度
//! - **控制层** (`control`): 跟踪循环、语音分发、语音输出线程
//! - **工具** (`tools`): 回复截断、机器人语音修饰
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use axio_sdk::prelude::*;
//! use std::sync::Arc;
//!
//! axio_sdk::init_logger();
//!
//! let link = Arc::new(LinkBuilder::new().port("/dev/ttyUSB0").build_or_unavailable());
//! let state = Arc::new(DeviceState::default());
//! let stop = StopSignal::new();
//!
//! let blink = BlinkScheduler::new(link.clone(), state.clone(), BlinkConfig::default())?
//!     .spawn(stop.clone())?;
//! # stop.stop();
//! # blink.join().ok();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use axio_control as control;
pub use axio_driver as driver;
pub use axio_link as link;
pub use axio_protocol as protocol;
pub use axio_tools as tools;

mod logging;
pub mod prelude;

pub use logging::{DEFAULT_FILTER, init_logger, init_logger_with_filter};

// 常用类型
pub use axio_control::{ControlError, Tracker, VoiceDispatcher};
pub use axio_driver::{CommandLink, DeviceState, DriverError, LinkBuilder, StopSignal};
pub use axio_link::{LinkAdapter, LinkError};
pub use axio_protocol::{Command, ProtocolError};
