//! 跟踪循环
//!
//! 每个周期：
//! 1. 从感知协作者取一帧，按优先级选出目标（无帧时沿用上一帧尺寸的画面中心）
//! 2. 闭眼时只感知、不驱动
//! 3. 睁眼时运动滤波 → 发送 `"<x>,<y>"`
//!
//! 跟踪循环是 [`ActuatorPosition`](crate::motion::ActuatorPosition) 的唯一写者，
//! 从不等待应答。退出时（停止信号或感知源关闭）尽力发送 `SLEEP` 并关闭链路。

use crate::collaborator::Perception;
use crate::error::{ControlError, PerceptionError};
use crate::motion::{ActuatorPosition, MotionConfig, MotionFilter};
use crate::target::{FrameSize, TargetPoint};
use axio_driver::{CommandLink, DeviceState, SendOutcome, StopSignal};
use axio_protocol::{Command, MAX_ANGLE};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// 跟踪配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    #[serde(flatten)]
    pub motion: MotionConfig,
    /// 首帧到达前使用的画面宽度
    pub frame_width: u32,
    /// 首帧到达前使用的画面高度
    pub frame_height: u32,
    /// 无帧或感知出错时的等待间隔（毫秒）
    pub idle_poll_ms: u64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            motion: MotionConfig::default(),
            frame_width: 640,
            frame_height: 480,
            idle_poll_ms: 10,
        }
    }
}

impl TrackingConfig {
    pub fn frame(&self) -> FrameSize {
        FrameSize::new(self.frame_width, self.frame_height)
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }

    pub fn validate(&self) -> Result<(), ControlError> {
        let m = &self.motion;
        if m.servo_min >= m.servo_max {
            return Err(ControlError::InvalidConfig(format!(
                "servo range {}..{} is empty",
                m.servo_min, m.servo_max
            )));
        }
        if m.servo_min < 0 || m.servo_max > MAX_ANGLE {
            return Err(ControlError::InvalidConfig(format!(
                "servo range {}..{} exceeds 0..{}",
                m.servo_min, m.servo_max, MAX_ANGLE
            )));
        }
        if !(m.smoothing > 0.0 && m.smoothing <= 1.0) {
            return Err(ControlError::InvalidConfig(format!(
                "smoothing factor {} must be in (0, 1]",
                m.smoothing
            )));
        }
        if !(m.servo_min..=m.servo_max).contains(&m.rest) {
            return Err(ControlError::InvalidConfig(format!(
                "rest angle {} outside servo range",
                m.rest
            )));
        }
        Ok(())
    }
}

/// 一次驱动
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actuation {
    pub position: ActuatorPosition,
    /// 叠加显示点（像素）
    pub overlay: (i32, i32),
    pub outcome: SendOutcome,
}

/// 单个周期的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackStep {
    pub target: TargetPoint,
    pub frame: FrameSize,
    /// 闭眼时为 `None`
    pub actuation: Option<Actuation>,
}

/// 跟踪循环
pub struct Tracker<P> {
    link: Arc<CommandLink>,
    state: Arc<DeviceState>,
    perception: P,
    filter: MotionFilter,
    last_frame: FrameSize,
    config: TrackingConfig,
}

impl<P: Perception> Tracker<P> {
    pub fn new(
        link: Arc<CommandLink>,
        state: Arc<DeviceState>,
        perception: P,
        config: TrackingConfig,
    ) -> Result<Self, ControlError> {
        config.validate()?;
        Ok(Self {
            link,
            state,
            perception,
            filter: MotionFilter::new(config.motion.clone()),
            last_frame: config.frame(),
            config,
        })
    }

    /// 当前舵机位置
    pub fn position(&self) -> ActuatorPosition {
        self.filter.position()
    }

    /// 执行一个周期
    ///
    /// 只有感知源本身出错时返回 `Err`；无帧、无检测都不是错误。
    pub fn step(&mut self) -> Result<TrackStep, PerceptionError> {
        let target = match self.perception.next_observation()? {
            Some(observation) => {
                self.last_frame = observation.frame;
                TargetPoint::select(&observation)
            },
            None => TargetPoint::centre(self.last_frame),
        };
        let frame = self.last_frame;

        if !self.state.eye_active() {
            return Ok(TrackStep {
                target,
                frame,
                actuation: None,
            });
        }

        let position = self.filter.update(target, frame);
        let outcome = self.link.send(Command::Position {
            x: position.x,
            y: position.y,
        });
        let overlay = self.filter.overlay(frame);
        trace!(
            "{} target ({}, {}) -> servo ({}, {})",
            target.source, target.x, target.y, position.x, position.y
        );

        Ok(TrackStep {
            target,
            frame,
            actuation: Some(Actuation {
                position,
                overlay,
                outcome,
            }),
        })
    }

    /// 运行直到收到停止信号或感知源关闭，然后让眼球休眠并关闭链路
    ///
    /// 返回时停止信号一定已置位，其他线程随之退出。
    pub fn run(mut self, stop: StopSignal) {
        info!("Tracking loop started");
        let idle = self.config.idle_poll();

        while !stop.is_stopped() {
            match self.step() {
                Ok(_) => {},
                Err(PerceptionError::Closed) => {
                    info!("Perception source closed");
                    break;
                },
                Err(e) => {
                    warn!("Perception error: {}", e);
                    stop.sleep(idle);
                },
            }
        }

        self.shutdown();
        stop.stop();
        info!("Tracking loop stopped");
    }

    /// 在独立线程中运行
    pub fn spawn(self, stop: StopSignal) -> Result<JoinHandle<()>, ControlError>
    where
        P: 'static,
    {
        std::thread::Builder::new()
            .name("axio-tracking".to_string())
            .spawn(move || self.run(stop))
            .map_err(|source| ControlError::Spawn {
                name: "tracking",
                source,
            })
    }

    fn shutdown(&mut self) {
        let outcome = self.link.send(Command::Sleep);
        debug!("Final SLEEP -> {:?}", outcome);
        self.link.close();
        self.state.set_eye_active(false);
    }
}
