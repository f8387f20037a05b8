//! 眼睛工作模式定义
//!
//! `eyeActive` 被跟踪线程以帧率级别的频率读取，因此不放进任何 Mutex，
//! 而是使用独立的原子变量，读取永远不会被对话相关的锁阻塞。

use std::sync::atomic::{AtomicU8, Ordering};

/// 眼睛工作模式
///
/// - **Asleep**: 眼睑闭合，跟踪和眨眼都暂停（启动默认）
/// - **Awake**: 眼睑张开，跟踪线程发送位置命令，眨眼线程随机眨眼
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum EyeMode {
    #[default]
    Asleep = 0,
    Awake = 1,
}

impl EyeMode {
    /// 从 u8 转换
    ///
    /// 如果值无效，返回 Asleep。
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Awake,
            _ => Self::Asleep,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_awake(self) -> bool {
        self == Self::Awake
    }

    pub fn from_active(active: bool) -> Self {
        if active { Self::Awake } else { Self::Asleep }
    }
}

/// 眼睛模式（原子版本，用于线程间共享）
#[derive(Debug, Default)]
pub struct AtomicEyeMode {
    inner: AtomicU8,
}

impl AtomicEyeMode {
    pub fn new(mode: EyeMode) -> Self {
        Self {
            inner: AtomicU8::new(mode.as_u8()),
        }
    }

    /// 获取当前模式
    pub fn get(&self) -> EyeMode {
        EyeMode::from_u8(self.inner.load(Ordering::Acquire))
    }

    /// 设置模式，返回之前的模式
    pub fn swap(&self, mode: EyeMode) -> EyeMode {
        EyeMode::from_u8(self.inner.swap(mode.as_u8(), Ordering::AcqRel))
    }
}
