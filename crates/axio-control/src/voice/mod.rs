//! 语音命令
//!
//! - `rules` - 有序规则表（从上到下，第一条命中的规则生效）
//! - `dispatcher` - 分发器：状态迁移、握手、AI 转发

mod dispatcher;
mod rules;

pub use dispatcher::{Dispatch, VoiceConfig, VoiceDispatcher};
pub use rules::{PhraseConfig, VoiceIntent, VoiceRule, VoiceRules};
