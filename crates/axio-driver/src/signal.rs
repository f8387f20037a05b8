//! 停止信号
//!
//! 所有后台循环共享同一个信号：每个周期开始时检查，长时间休眠也按小片切分，
//! 退出请求最多延迟一个休眠片就能被观察到，而不必等完整的眨眼间隔。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// 两次检查之间的最长连续休眠
const SLEEP_SLICE: Duration = Duration::from_millis(20);

/// 超时无法表示为 `Instant` 时使用的等待上限（一年）
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// `now + timeout`，溢出时退化为一个很远的截止时间
pub(crate) fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

/// 跨线程停止信号
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    stopped: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// 通知所有持有者收尾退出
    pub fn stop(&self) {
        // Release：置位前的写入对观察到信号的循环可见
        self.stopped.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// 休眠 `duration`，除非中途收到停止信号
    ///
    /// 睡满返回 `true`，被打断返回 `false`。
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = deadline_after(duration);
        loop {
            if self.is_stopped() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            std::thread::sleep((deadline - now).min(SLEEP_SLICE));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_completes() {
        let signal = StopSignal::new();
        let start = Instant::now();
        assert!(signal.sleep(Duration::from_millis(30)));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_sleep_interrupted_by_stop() {
        let signal = StopSignal::new();
        let remote = signal.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            remote.stop();
        });

        let start = Instant::now();
        assert!(!signal.sleep(Duration::from_secs(5)));
        assert!(start.elapsed() < Duration::from_secs(1));
        handle.join().unwrap();
    }

    #[test]
    fn test_stopped_signal_never_sleeps() {
        let signal = StopSignal::new();
        signal.stop();
        assert!(signal.is_stopped());
        assert!(!signal.sleep(Duration::from_secs(1)));
    }

    #[test]
    fn test_unbounded_duration_does_not_overflow() {
        let deadline = deadline_after(Duration::MAX);
        assert!(deadline > Instant::now());

        let signal = StopSignal::new();
        let remote = signal.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            remote.stop();
        });
        assert!(!signal.sleep(Duration::MAX));
        handle.join().unwrap();
    }
}
