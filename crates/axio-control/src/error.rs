//! 控制层错误类型
//!
//! 协作者错误全部是"非致命"的：调用方按结果分支处理，不会向上传播导致线程退出。

use axio_driver::DriverError;
use thiserror::Error;

/// 控制层错误
#[derive(Error, Debug)]
pub enum ControlError {
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// 线程创建失败
    #[error("Failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// 语音识别结果错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListenError {
    /// 没有听懂（静音、噪声）
    #[error("No speech understood")]
    NoSpeech,

    /// 识别服务出错
    #[error("Recognition service error: {0}")]
    Service(String),

    /// 输入源已关闭，不会再有新的发言
    #[error("Speech input closed")]
    Closed,
}

/// AI 对话错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("{0}")]
    Config(String),
}

/// 语音合成错误
#[derive(Error, Debug)]
pub enum SpeakError {
    #[error("Speech synthesizer I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Speech synthesizer exited with {0}")]
    Exit(String),
}

/// 感知错误
#[derive(Error, Debug)]
pub enum PerceptionError {
    #[error("Perception I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed observation: {0}")]
    Decode(String),

    /// 感知源已关闭（跟踪循环据此退出）
    #[error("Perception source closed")]
    Closed,
}
