//! # Axio Protocol
//!
//! 眼球执行器串口协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `command`: 下行命令（`WAKE` / `SLEEP` / `BLINK` / `<x>,<y>`）
//! - `ack`: 握手应答匹配
//! - `decoder`: 上行字节流的行解码
//!
//! ## 帧格式
//!
//! 每条命令是一行 UTF-8 文本，以 `\n` 结尾。没有校验和，也没有长度前缀，
//! 可靠性完全依赖行结束符，以及 WAKE/SLEEP 专用的应答握手。

pub mod ack;
pub mod command;
pub mod decoder;

pub use ack::{ACK_ASLEEP, ACK_AWAKE, ack_matches};
pub use command::{Command, LINE_TERMINATOR, MAX_ANGLE};
pub use decoder::LineDecoder;

use thiserror::Error;

/// 协议解析错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Empty command line")]
    Empty,

    #[error("Unknown command: {0:?}")]
    UnknownCommand(String),

    #[error("Invalid position field {field}: {value:?}")]
    InvalidPosition { field: &'static str, value: String },

    #[error("Angle {field}={value} outside 0..={max}")]
    AngleOutOfRange { field: &'static str, value: i32, max: i32 },
}
