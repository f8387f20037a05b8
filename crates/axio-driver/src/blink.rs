//! 眨眼调度
//!
//! 两个逻辑状态：
//! - **Dormant**（闭眼）：短暂休眠后重新检查 `eye_active`
//! - **Blinking**（睁眼）：随机等待 [1.0s, 5.0s] → 发送 `BLINK` → 随机等待 [0.3s, 0.6s]
//!
//! 状态只在每个周期开始时检查；一旦进入 Blinking 周期，这次眨眼一定会完成。

use crate::error::DriverError;
use crate::link::{CommandLink, SendOutcome};
use crate::signal::StopSignal;
use crate::state::DeviceState;
use axio_protocol::Command;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, trace};

/// 眨眼调度配置（单位：毫秒）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    /// Dormant 状态的检查间隔
    pub dormant_poll_ms: u64,
    /// 两次眨眼之间的随机间隔下限
    pub interval_min_ms: u64,
    /// 两次眨眼之间的随机间隔上限
    pub interval_max_ms: u64,
    /// 眨眼后的随机停顿下限
    pub settle_min_ms: u64,
    /// 眨眼后的随机停顿上限
    pub settle_max_ms: u64,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            dormant_poll_ms: 100,
            interval_min_ms: 1000,
            interval_max_ms: 5000,
            settle_min_ms: 300,
            settle_max_ms: 600,
        }
    }
}

impl BlinkConfig {
    /// 检查区间是否合法
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.interval_min_ms > self.interval_max_ms {
            return Err(DriverError::InvalidConfig(format!(
                "blink interval {}..{} ms is empty",
                self.interval_min_ms, self.interval_max_ms
            )));
        }
        if self.settle_min_ms > self.settle_max_ms {
            return Err(DriverError::InvalidConfig(format!(
                "blink settle {}..{} ms is empty",
                self.settle_min_ms, self.settle_max_ms
            )));
        }
        Ok(())
    }
}

/// 单个周期的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkCycle {
    /// 闭眼状态，只做了一次检查
    Dormant,
    /// 发送了 BLINK
    Blinked(SendOutcome),
    /// 等待期间收到停止信号，本周期中止
    Stopped,
}

/// 眨眼调度器
pub struct BlinkScheduler {
    link: Arc<CommandLink>,
    state: Arc<DeviceState>,
    config: BlinkConfig,
    rng: StdRng,
}

impl BlinkScheduler {
    pub fn new(
        link: Arc<CommandLink>,
        state: Arc<DeviceState>,
        config: BlinkConfig,
    ) -> Result<Self, DriverError> {
        config.validate()?;
        Ok(Self {
            link,
            state,
            config,
            rng: StdRng::from_entropy(),
        })
    }

    /// 使用固定种子（测试用，保证间隔可复现）
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// 执行一个周期
    pub fn cycle(&mut self, stop: &StopSignal) -> BlinkCycle {
        if !self.state.eye_active() {
            let poll = Duration::from_millis(self.config.dormant_poll_ms);
            return if stop.sleep(poll) {
                BlinkCycle::Dormant
            } else {
                BlinkCycle::Stopped
            };
        }

        let interval = self.draw(self.config.interval_min_ms, self.config.interval_max_ms);
        trace!("Next blink in {:?}", interval);
        if !stop.sleep(interval) {
            return BlinkCycle::Stopped;
        }

        let outcome = self.link.send(Command::Blink);
        debug!("BLINK -> {:?}", outcome);

        let settle = self.draw(self.config.settle_min_ms, self.config.settle_max_ms);
        stop.sleep(settle);
        BlinkCycle::Blinked(outcome)
    }

    /// 运行直到收到停止信号
    pub fn run(mut self, stop: StopSignal) {
        info!("Blink scheduler started");
        while !stop.is_stopped() {
            self.cycle(&stop);
        }
        info!("Blink scheduler stopped");
    }

    /// 在独立线程中运行
    pub fn spawn(self, stop: StopSignal) -> std::io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("axio-blink".to_string())
            .spawn(move || self.run(stop))
    }

    fn draw(&mut self, min_ms: u64, max_ms: u64) -> Duration {
        Duration::from_millis(self.rng.gen_range(min_ms..=max_ms))
    }
}
