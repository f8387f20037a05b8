//! 共享设备状态
//!
//! 两个字段各有独立的保护：
//! - `eye`：原子变量，跟踪线程每帧读取，不能被对话锁阻塞
//! - `conversation`：对话开关与对话历史总是一起修改，共用一把 Mutex
//!
//! 任何线程都不会在持有 `conversation` 锁的同时调用语音或 AI 协作者。

use crate::history::ConversationHistory;
use crate::mode::{AtomicEyeMode, EyeMode};
use parking_lot::Mutex;

/// 对话状态（受同一把锁保护）
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    pub active: bool,
    pub history: ConversationHistory,
}

/// 状态快照（用于日志和 UI 显示）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSnapshot {
    pub eye: EyeMode,
    pub conversation_active: bool,
    pub history_len: usize,
}

/// 设备状态
///
/// 启动时为 `{ eye: Asleep, conversation: inactive }`，进程生命周期内持续修改。
#[derive(Debug, Default)]
pub struct DeviceState {
    eye: AtomicEyeMode,
    conversation: Mutex<ConversationState>,
}

impl DeviceState {
    /// 创建初始状态
    ///
    /// # 参数
    /// - `history_max_turns`: 对话历史保留的轮数
    pub fn new(history_max_turns: usize) -> Self {
        Self {
            eye: AtomicEyeMode::new(EyeMode::Asleep),
            conversation: Mutex::new(ConversationState {
                active: false,
                history: ConversationHistory::new(history_max_turns),
            }),
        }
    }

    pub fn eye_mode(&self) -> EyeMode {
        self.eye.get()
    }

    pub fn eye_active(&self) -> bool {
        self.eye.get().is_awake()
    }

    /// 设置睁眼状态，返回之前的值
    pub fn set_eye_active(&self, active: bool) -> bool {
        self.eye.swap(EyeMode::from_active(active)).is_awake()
    }

    pub fn conversation_active(&self) -> bool {
        self.conversation.lock().active
    }

    /// 进入对话模式并清空历史
    pub fn start_conversation(&self) {
        let mut conversation = self.conversation.lock();
        conversation.active = true;
        conversation.history.clear();
    }

    /// 退出对话模式（保留历史，下次进入时清空）
    pub fn stop_conversation(&self) {
        self.conversation.lock().active = false;
    }

    /// 在对话锁内执行闭包
    ///
    /// 闭包必须是短小的纯内存操作，不能包含阻塞调用。
    pub fn with_conversation<R>(&self, f: impl FnOnce(&mut ConversationState) -> R) -> R {
        let mut conversation = self.conversation.lock();
        f(&mut conversation)
    }

    pub fn snapshot(&self) -> DeviceSnapshot {
        let eye = self.eye.get();
        let conversation = self.conversation.lock();
        DeviceSnapshot {
            eye,
            conversation_active: conversation.active,
            history_len: conversation.history.len(),
        }
    }
}
