//! # Axio Tools - 纯文本工具
//!
//! **依赖原则**: 不依赖任何硬件或线程相关的 crate
//!
//! ## 包含模块
//!
//! - `text` - 回复截断（纯函数）
//! - `effects` - 机器人语音修饰（随机源由调用者注入）

pub mod effects;
pub mod text;

// 重新导出常用类型
pub use effects::{RoboticEffects, VoiceRange};
pub use text::truncate_sentences;
