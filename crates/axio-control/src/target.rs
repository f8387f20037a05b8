//! 跟踪目标
//!
//! 感知协作者每帧给出零或一组手部关键点、零或一个人脸框（归一化坐标），
//! 这里按优先级 Hand > Face > 画面中心 选出唯一的像素目标点。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 手掌中心关键点的下标
pub const PALM_LANDMARK: usize = 9;

/// 画面尺寸（像素）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// 以 i32 返回宽高（超出范围时饱和）
    pub fn as_i32(&self) -> (i32, i32) {
        (
            i32::try_from(self.width).unwrap_or(i32::MAX),
            i32::try_from(self.height).unwrap_or(i32::MAX),
        )
    }

    /// 画面中心
    pub fn centre(&self) -> (i32, i32) {
        let (w, h) = self.as_i32();
        (w / 2, h / 2)
    }

    /// 归一化坐标 → 像素坐标（向零截断）
    pub fn to_pixels(&self, x: f64, y: f64) -> (i32, i32) {
        (
            (x * f64::from(self.width)) as i32,
            (y * f64::from(self.height)) as i32,
        )
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

/// 归一化坐标点（0.0 ~ 1.0，相对画面宽高）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 归一化人脸框
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// 框中心（归一化）
    pub fn centre(&self) -> NormalizedPoint {
        NormalizedPoint::new(self.xmin + self.width / 2.0, self.ymin + self.height / 2.0)
    }
}

/// 单帧感知结果
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Observation {
    pub frame: FrameSize,
    /// 第一只手的关键点（空表示未检测到）
    #[serde(default)]
    pub hand: Vec<NormalizedPoint>,
    /// 第一张人脸
    #[serde(default)]
    pub face: Option<BoundingBox>,
}

impl Observation {
    /// 没有任何检测结果的帧
    pub fn empty(frame: FrameSize) -> Self {
        Self {
            frame,
            hand: Vec::new(),
            face: None,
        }
    }

    pub fn with_hand(mut self, landmarks: Vec<NormalizedPoint>) -> Self {
        self.hand = landmarks;
        self
    }

    pub fn with_face(mut self, face: BoundingBox) -> Self {
        self.face = Some(face);
        self
    }

    /// 手掌中心：优先第 9 个关键点，不足时退回第 0 个
    pub fn palm(&self) -> Option<NormalizedPoint> {
        self.hand.get(PALM_LANDMARK).or_else(|| self.hand.first()).copied()
    }
}

/// 目标来源（同时也是优先级，Hand 最高）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetSource {
    Hand,
    Face,
    None,
}

impl fmt::Display for TargetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSource::Hand => write!(f, "Palm"),
            TargetSource::Face => write!(f, "Face"),
            TargetSource::None => write!(f, "None"),
        }
    }
}

/// 像素目标点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetPoint {
    pub x: i32,
    pub y: i32,
    pub source: TargetSource,
}

impl TargetPoint {
    pub const fn new(x: i32, y: i32, source: TargetSource) -> Self {
        Self { x, y, source }
    }

    /// 画面中心（无检测时的回退目标）
    pub fn centre(frame: FrameSize) -> Self {
        let (x, y) = frame.centre();
        Self::new(x, y, TargetSource::None)
    }

    /// 按 Hand > Face > 中心 的优先级选择目标
    pub fn select(observation: &Observation) -> Self {
        let frame = observation.frame;
        if let Some(palm) = observation.palm() {
            let (x, y) = frame.to_pixels(palm.x, palm.y);
            return Self::new(x, y, TargetSource::Hand);
        }
        if let Some(face) = observation.face {
            let centre = face.centre();
            let (x, y) = frame.to_pixels(centre.x, centre.y);
            return Self::new(x, y, TargetSource::Face);
        }
        Self::centre(frame)
    }
}
