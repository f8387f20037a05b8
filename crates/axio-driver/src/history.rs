//! 对话历史
//!
//! 按插入顺序保存用户/助手的发言，容量以"轮"为单位（一轮 = 一问一答），
//! 超出容量时从最旧的记录开始淘汰。

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// 默认保留的轮数
pub const DEFAULT_MAX_TURNS: usize = 8;

/// 发言角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// 一条发言
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// 有界对话历史
///
/// # Example
///
/// ```
/// use axio_driver::ConversationHistory;
///
/// let mut history = ConversationHistory::new(1);
/// history.record_exchange("hi", "hello");
/// history.record_exchange("how are you", "fine");
/// assert_eq!(history.len(), 2);
/// assert_eq!(history.turns().next().unwrap().text, "how are you");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationHistory {
    entries: VecDeque<Turn>,
    max_turns: usize,
}

impl ConversationHistory {
    pub fn new(max_turns: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_turns * 2 + 2),
            max_turns,
        }
    }

    /// 最大条目数（每轮两条）
    pub fn max_entries(&self) -> usize {
        self.max_turns * 2
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// 追加一条发言并裁剪
    pub fn push(&mut self, turn: Turn) {
        self.entries.push_back(turn);
        self.prune();
    }

    /// 追加一问一答，然后统一裁剪
    pub fn record_exchange(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.entries.push_back(Turn::user(user));
        self.entries.push_back(Turn::assistant(assistant));
        self.prune();
    }

    fn prune(&mut self) {
        let max = self.max_entries();
        while self.entries.len() > max {
            self.entries.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按时间顺序遍历（最旧的在前）
    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.entries.iter()
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TURNS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ninth_pair_evicts_oldest() {
        let mut history = ConversationHistory::new(8);
        for i in 0..9 {
            history.record_exchange(format!("q{i}"), format!("a{i}"));
        }

        assert_eq!(history.len(), 16);
        let texts: Vec<&str> = history.turns().map(|t| t.text.as_str()).collect();
        let expected: Vec<String> = (1..9)
            .flat_map(|i| [format!("q{i}"), format!("a{i}")])
            .collect();
        assert_eq!(texts, expected);
        assert_eq!(history.turns().next().unwrap().role, Role::User);
    }

    #[test]
    fn test_below_capacity_keeps_everything() {
        let mut history = ConversationHistory::new(8);
        history.record_exchange("hi", "hello");
        assert_eq!(history.len(), 2);
        assert_eq!(
            history.turns().cloned().collect::<Vec<_>>(),
            vec![Turn::user("hi"), Turn::assistant("hello")]
        );
    }

    #[test]
    fn test_single_push_prunes() {
        let mut history = ConversationHistory::new(1);
        history.push(Turn::user("a"));
        history.push(Turn::assistant("b"));
        history.push(Turn::user("c"));
        assert_eq!(history.len(), 2);
        assert_eq!(history.turns().next().unwrap().text, "b");
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut history = ConversationHistory::new(0);
        history.record_exchange("a", "b");
        assert!(history.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut history = ConversationHistory::default();
        history.record_exchange("a", "b");
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.max_turns(), DEFAULT_MAX_TURNS);
    }
}
