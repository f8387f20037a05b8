//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use axio_sdk::prelude::*;
//! ```

// 协议与链路
pub use axio_link::LinkAdapter;
pub use axio_protocol::Command;

// 驱动层
pub use axio_driver::{
    AckOutcome, BlinkConfig, BlinkScheduler, CommandLink, DeviceState, EyeMode, LinkBuilder,
    LinkConfig, SendOutcome, StopSignal,
};

// 控制层
pub use axio_control::{
    ChatBackend, Dispatch, Observation, Perception, SpeechHandle, SpeechInput, SpeechOutput,
    TargetPoint, Tracker, TrackingConfig, VoiceConfig, VoiceDispatcher, speech_channel,
};

// 错误类型
pub use axio_control::{ChatError, ControlError, ListenError, PerceptionError, SpeakError};
pub use axio_driver::DriverError;
pub use axio_link::LinkError;
pub use axio_protocol::ProtocolError;
