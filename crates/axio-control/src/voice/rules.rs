//! 语音命令规则表
//!
//! 规则按顺序求值，第一条命中的规则生效。顺序即优先级：
//! 唤醒 > 休眠 > 开始对话 > 结束对话，任何命令短语都优先于自由对话转发。
//! 匹配方式为忽略大小写的子串包含。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 命令意图
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoiceIntent {
    Wake,
    Sleep,
    StartConversation,
    StopConversation,
}

impl fmt::Display for VoiceIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VoiceIntent::Wake => "wake",
            VoiceIntent::Sleep => "sleep",
            VoiceIntent::StartConversation => "start-conversation",
            VoiceIntent::StopConversation => "stop-conversation",
        };
        f.write_str(name)
    }
}

/// 触发短语配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhraseConfig {
    pub wake: Vec<String>,
    pub sleep: Vec<String>,
    pub say: Vec<String>,
    pub stop: Vec<String>,
}

fn phrases(list: &[&str]) -> Vec<String> {
    list.iter().map(|p| p.to_string()).collect()
}

impl Default for PhraseConfig {
    fn default() -> Self {
        Self {
            wake: phrases(&["hey axio"]),
            sleep: phrases(&["sleep axio", "sleep a", "sleep"]),
            say: phrases(&["say axio", "say a", "say"]),
            stop: phrases(&["stop axio", "stop a", "stop"]),
        }
    }
}

/// 一条规则：任一短语命中即产生对应意图
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceRule {
    pub intent: VoiceIntent,
    phrases: Vec<String>,
}

impl VoiceRule {
    pub fn new(intent: VoiceIntent, phrases: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            intent,
            phrases: phrases
                .into_iter()
                .map(|p| p.into().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// `normalized` 必须已转为小写
    pub fn matches(&self, normalized: &str) -> bool {
        self.phrases.iter().any(|p| normalized.contains(p.as_str()))
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}

/// 有序规则表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceRules {
    rules: Vec<VoiceRule>,
}

impl VoiceRules {
    pub fn new(rules: Vec<VoiceRule>) -> Self {
        Self { rules }
    }

    /// 按 唤醒 → 休眠 → 开始 → 结束 的顺序构建
    pub fn from_phrases(config: &PhraseConfig) -> Self {
        Self::new(vec![
            VoiceRule::new(VoiceIntent::Wake, config.wake.iter().cloned()),
            VoiceRule::new(VoiceIntent::Sleep, config.sleep.iter().cloned()),
            VoiceRule::new(VoiceIntent::StartConversation, config.say.iter().cloned()),
            VoiceRule::new(VoiceIntent::StopConversation, config.stop.iter().cloned()),
        ])
    }

    /// 规范化：去除首尾空白并转小写
    pub fn normalize(utterance: &str) -> String {
        utterance.trim().to_lowercase()
    }

    /// 返回第一条命中的规则意图
    pub fn classify(&self, utterance: &str) -> Option<VoiceIntent> {
        let normalized = Self::normalize(utterance);
        self.rules
            .iter()
            .find(|rule| rule.matches(&normalized))
            .map(|rule| rule.intent)
    }

    pub fn rules(&self) -> &[VoiceRule] {
        &self.rules
    }
}

impl Default for VoiceRules {
    fn default() -> Self {
        Self::from_phrases(&PhraseConfig::default())
    }
}
