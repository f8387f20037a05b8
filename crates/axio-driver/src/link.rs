//! 命令链路
//!
//! 整个进程只有一个 `CommandLink`，所有写入和应答等待都经过同一把 Mutex：
//! - 两个线程并发 `send` 时，命令整行写入，字符永远不会交错
//! - `await_ack` 在等待期间持有这把锁，握手期间跟踪线程和眨眼线程的命令会被阻塞
//!   （最长为握手超时）。
//!
//! 任何 IO 错误都会被记录并使链路永久降级：适配器被丢弃，之后的调用直接返回
//! `Unavailable`，不再触碰设备，进程继续运行。

use crate::error::DriverError;
use crate::metrics::LinkMetrics;
use crate::signal::deadline_after;
use axio_link::{LinkAdapter, LinkError};
use axio_protocol::{Command, ack_matches};
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, error, trace, warn};

type BoxedAdapter = Box<dyn LinkAdapter + Send>;

/// 链路配置
///
/// # Example
///
/// ```
/// use axio_driver::LinkConfig;
///
/// let config = LinkConfig::default();
/// assert_eq!(config.ack_timeout().as_millis(), 1500);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// WAKE/SLEEP 握手超时（毫秒）
    pub ack_timeout_ms: u64,
    /// 等待应答时的轮询间隔（毫秒）
    pub ack_poll_ms: u64,
}

impl LinkConfig {
    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }

    pub fn ack_poll(&self) -> Duration {
        Duration::from_millis(self.ack_poll_ms.max(1))
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            ack_timeout_ms: 1500,
            ack_poll_ms: 10,
        }
    }
}

/// 单条命令的投递结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// 已完整写入字节流
    Delivered,
    /// 链路不可用（未打开或已降级），命令被丢弃
    Unavailable,
}

impl SendOutcome {
    pub fn is_delivered(self) -> bool {
        self == SendOutcome::Delivered
    }
}

/// 握手结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    /// 超时前收到了包含期望子串的行
    Matched,
    /// 超时未收到应答
    TimedOut,
    /// 链路不可用
    Unavailable,
}

impl AckOutcome {
    pub fn is_matched(self) -> bool {
        self == AckOutcome::Matched
    }

    /// 转换为 `Result`（供需要严格确认的调用者使用，如 `axio probe`）
    pub fn into_result(self, expected: &str, timeout: Duration) -> Result<(), DriverError> {
        match self {
            AckOutcome::Matched => Ok(()),
            AckOutcome::TimedOut => Err(DriverError::AckTimeout {
                expected: expected.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
            AckOutcome::Unavailable => Err(DriverError::LinkUnavailable),
        }
    }
}

/// 串行化的命令链路
pub struct CommandLink {
    adapter: Mutex<Option<BoxedAdapter>>,
    available: AtomicBool,
    config: LinkConfig,
    metrics: Arc<LinkMetrics>,
    name: String,
}

impl CommandLink {
    /// 包装一个已打开的适配器
    pub fn new(adapter: impl LinkAdapter + Send + 'static, config: LinkConfig) -> Self {
        let name = adapter.name().to_string();
        Self {
            adapter: Mutex::new(Some(Box::new(adapter))),
            available: AtomicBool::new(true),
            config,
            metrics: Arc::new(LinkMetrics::new()),
            name,
        }
    }

    /// 创建一个不可用的链路（设备打开失败时的降级形态）
    pub fn unavailable(config: LinkConfig) -> Self {
        Self {
            adapter: Mutex::new(None),
            available: AtomicBool::new(false),
            config,
            metrics: Arc::new(LinkMetrics::new()),
            name: "unavailable".to_string(),
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<LinkMetrics> {
        &self.metrics
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 链路是否可用（不获取写锁，握手期间也能立即返回）
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    /// 发送一条命令
    pub fn send(&self, command: Command) -> SendOutcome {
        let line = command.encode();
        let mut slot = self.adapter.lock();
        let outcome = self.write_locked(&mut slot, &line);
        if outcome.is_delivered() && command.is_position() {
            LinkMetrics::incr(&self.metrics.positions_sent);
        }
        outcome
    }

    /// 等待一行包含 `expected`（忽略大小写）的应答
    pub fn await_ack(&self, expected: &str, timeout: Duration) -> bool {
        self.await_ack_outcome(expected, timeout).is_matched()
    }

    /// 等待应答，返回详细结果
    pub fn await_ack_outcome(&self, expected: &str, timeout: Duration) -> AckOutcome {
        let mut slot = self.adapter.lock();
        self.wait_locked(&mut slot, expected, timeout)
    }

    /// 完整握手：清空旧输入 → 发送命令 → 等待应答
    ///
    /// 整个过程只获取一次写锁，其他线程的命令不会插入握手中间。
    pub fn handshake(&self, command: Command, expected: &str, timeout: Duration) -> AckOutcome {
        let mut slot = self.adapter.lock();
        self.clear_locked(&mut slot);

        match self.write_locked(&mut slot, &command.encode()) {
            SendOutcome::Delivered => self.wait_locked(&mut slot, expected, timeout),
            SendOutcome::Unavailable => AckOutcome::Unavailable,
        }
    }

    /// 使用配置的超时执行 WAKE/SLEEP 握手
    ///
    /// 命令没有定义应答时只发送，不等待。
    pub fn handshake_default(&self, command: Command) -> AckOutcome {
        match command.expected_ack() {
            Some(expected) => self.handshake(command, expected, self.config.ack_timeout()),
            None => match self.send(command) {
                SendOutcome::Delivered => AckOutcome::Matched,
                SendOutcome::Unavailable => AckOutcome::Unavailable,
            },
        }
    }

    /// 丢弃设备已发出但尚未读取的输入
    pub fn clear_input(&self) {
        let mut slot = self.adapter.lock();
        self.clear_locked(&mut slot);
    }

    /// 关闭链路（释放适配器）
    pub fn close(&self) {
        let mut slot = self.adapter.lock();
        if slot.take().is_some() {
            debug!("Closed link {}", self.name);
        }
        self.available.store(false, Ordering::Release);
    }

    fn clear_locked(&self, slot: &mut MutexGuard<'_, Option<BoxedAdapter>>) {
        if let Some(adapter) = slot.as_mut()
            && let Err(e) = adapter.clear_input()
        {
            debug!("Failed to clear input on {}: {}", self.name, e);
        }
    }

    fn write_locked(&self, slot: &mut MutexGuard<'_, Option<BoxedAdapter>>, line: &str) -> SendOutcome {
        let Some(adapter) = slot.as_mut() else {
            LinkMetrics::incr(&self.metrics.commands_dropped);
            trace!("Link unavailable, dropping {:?}", line.trim_end());
            return SendOutcome::Unavailable;
        };

        match adapter.write_all(line.as_bytes()) {
            Ok(()) => {
                LinkMetrics::incr(&self.metrics.commands_sent);
                trace!("{} <- {}", self.name, line.trim_end());
                SendOutcome::Delivered
            },
            Err(e) => {
                self.degrade(slot, &e);
                LinkMetrics::incr(&self.metrics.commands_dropped);
                SendOutcome::Unavailable
            },
        }
    }

    fn wait_locked(
        &self,
        slot: &mut MutexGuard<'_, Option<BoxedAdapter>>,
        expected: &str,
        timeout: Duration,
    ) -> AckOutcome {
        let deadline = deadline_after(timeout);
        let poll = self.config.ack_poll();

        loop {
            let Some(adapter) = slot.as_mut() else {
                return AckOutcome::Unavailable;
            };

            match adapter.poll_line() {
                Ok(Some(line)) => {
                    LinkMetrics::incr(&self.metrics.lines_received);
                    debug!("device -> {}", line);
                    if ack_matches(&line, expected) {
                        LinkMetrics::incr(&self.metrics.acks_matched);
                        return AckOutcome::Matched;
                    }
                    if Instant::now() < deadline {
                        continue;
                    }
                },
                Ok(None) => {},
                Err(e) if e.is_timeout() => {},
                Err(e) => {
                    self.degrade(slot, &e);
                    return AckOutcome::Unavailable;
                },
            }

            let now = Instant::now();
            if now >= deadline {
                LinkMetrics::incr(&self.metrics.ack_timeouts);
                warn!("No {} acknowledgment from {} within {:?}", expected, self.name, timeout);
                return AckOutcome::TimedOut;
            }
            std::thread::sleep(poll.min(deadline - now));
        }
    }

    fn degrade(&self, slot: &mut MutexGuard<'_, Option<BoxedAdapter>>, err: &LinkError) {
        error!(
            "Link {} failed: {}; further commands will be dropped",
            self.name, err
        );
        LinkMetrics::incr(&self.metrics.io_errors);
        **slot = None;
        self.available.store(false, Ordering::Release);
    }
}
