//! 链路指标模块
//!
//! 提供原子计数器，用于监控串口链路的健康状态。
//! 所有计数器都可以在任何线程读取，不会和命令写入争用锁。

use std::sync::atomic::{AtomicU64, Ordering};

/// 链路实时指标
#[derive(Debug, Default)]
pub struct LinkMetrics {
    /// 成功写入的命令数
    pub commands_sent: AtomicU64,

    /// 其中的位置命令数
    pub positions_sent: AtomicU64,

    /// 因链路不可用而丢弃的命令数
    pub commands_dropped: AtomicU64,

    /// 写入/读取失败次数（每次都会导致链路降级）
    pub io_errors: AtomicU64,

    /// 收到的上行行数
    pub lines_received: AtomicU64,

    /// 匹配成功的握手次数
    pub acks_matched: AtomicU64,

    /// 超时的握手次数
    pub ack_timeouts: AtomicU64,
}

impl LinkMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取指标快照
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            commands_sent: self.commands_sent.load(Ordering::Relaxed),
            positions_sent: self.positions_sent.load(Ordering::Relaxed),
            commands_dropped: self.commands_dropped.load(Ordering::Relaxed),
            io_errors: self.io_errors.load(Ordering::Relaxed),
            lines_received: self.lines_received.load(Ordering::Relaxed),
            acks_matched: self.acks_matched.load(Ordering::Relaxed),
            ack_timeouts: self.ack_timeouts.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// 指标快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub commands_sent: u64,
    pub positions_sent: u64,
    pub commands_dropped: u64,
    pub io_errors: u64,
    pub lines_received: u64,
    pub acks_matched: u64,
    pub ack_timeouts: u64,
}

impl MetricsSnapshot {
    /// 握手成功率（0.0 ~ 1.0），没有握手时返回 None
    pub fn ack_success_rate(&self) -> Option<f64> {
        let total = self.acks_matched + self.ack_timeouts;
        (total > 0).then(|| self.acks_matched as f64 / total as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let metrics = LinkMetrics::new();
        LinkMetrics::incr(&metrics.commands_sent);
        LinkMetrics::incr(&metrics.commands_sent);
        LinkMetrics::incr(&metrics.ack_timeouts);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.commands_sent, 2);
        assert_eq!(snapshot.ack_timeouts, 1);
        assert_eq!(snapshot.io_errors, 0);
    }

    #[test]
    fn test_ack_success_rate() {
        let snapshot = MetricsSnapshot::default();
        assert_eq!(snapshot.ack_success_rate(), None);

        let snapshot = MetricsSnapshot {
            acks_matched: 3,
            ack_timeouts: 1,
            ..Default::default()
        };
        assert_eq!(snapshot.ack_success_rate(), Some(0.75));
    }
}
