//! 控制层模块
//!
//! 在驱动层之上提供 Axio 的三个业务循环：
//! - `tracking` - 跟踪循环（感知 → 运动滤波 → 位置命令）
//! - `voice` - 语音命令规则表与分发器
//! - `speech` - 语音输出工作线程（单槽邮箱，最新的一句覆盖未播放的旧句）
//!
//! 外部协作者（感知、语音识别、AI 对话、语音合成）只通过 [`collaborator`]
//! 中的 trait 接入，本 crate 不包含任何具体实现。

pub mod collaborator;
pub mod conversation;
mod error;
pub mod motion;
pub mod speech;
pub mod target;
pub mod tracking;
pub mod voice;

// 重新导出常用类型
pub use collaborator::{ChatBackend, Perception, SpeechInput, SpeechOutput};
pub use conversation::{DEFAULT_PERSONA, render_prompt};
pub use error::{ChatError, ControlError, ListenError, PerceptionError, SpeakError};
pub use motion::{ActuatorPosition, MotionConfig, MotionFilter, map_range, smooth};
pub use speech::{SpeechHandle, SpeechStats, SpeechWorker, speech_channel};
pub use target::{BoundingBox, FrameSize, NormalizedPoint, Observation, TargetPoint, TargetSource};
pub use tracking::{Actuation, TrackStep, Tracker, TrackingConfig};
pub use voice::{Dispatch, PhraseConfig, VoiceConfig, VoiceDispatcher, VoiceIntent, VoiceRules};
