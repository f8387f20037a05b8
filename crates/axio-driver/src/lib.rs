//! 驱动层模块
//!
//! 本模块提供 Axio 眼球执行器的设备侧并发核心，包括：
//! - 命令链路（单一互斥保护所有写入与应答等待）
//! - 共享设备状态（睁眼/闭眼、对话模式，各自独立加锁）
//! - 眨眼调度线程
//! - 链路指标（原子计数器）
//!
//! # 线程模型
//!
//! 所有组件通过 `Arc` 共享注入，不使用全局可变状态。
//! 跟踪线程、眨眼线程、语音线程都只通过 [`CommandLink`] 接触串口。

pub mod blink;
mod builder;
mod error;
pub mod history;
pub mod link;
pub mod metrics;
pub mod mode;
pub mod signal;
pub mod state;

pub use blink::{BlinkConfig, BlinkCycle, BlinkScheduler};
pub use builder::LinkBuilder;
pub use error::DriverError;
pub use history::{ConversationHistory, Role, Turn};
pub use link::{AckOutcome, CommandLink, LinkConfig, SendOutcome};
pub use metrics::{LinkMetrics, MetricsSnapshot};
pub use mode::{AtomicEyeMode, EyeMode};
pub use signal::StopSignal;
pub use state::{ConversationState, DeviceSnapshot, DeviceState};
