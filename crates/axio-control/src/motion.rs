//! 运动滤波
//!
//! 把像素坐标目标转换为平滑的舵机角度：
//! 1. 线性映射 `map_range`：像素 → 角度（先截断到输入区间）
//! 2. 一阶低通 `smooth`：每周期走完剩余距离的固定比例
//!
//! 另外把当前角度反向映射回屏幕坐标，仅用于可视化。

use crate::target::{FrameSize, TargetPoint};
use serde::{Deserialize, Serialize};

/// 线性映射
///
/// - `value` 先截断到 `[in_min, in_max]`
/// - 结果向零截断
/// - 输入区间退化（`in_min == in_max`）时返回 `out_min`
///
/// # Example
///
/// ```
/// use axio_control::map_range;
///
/// assert_eq!(map_range(320, 0, 640, 10, 170), 90);
/// assert_eq!(map_range(-50, 0, 640, 10, 170), 10);
/// assert_eq!(map_range(5, 3, 3, 10, 170), 10);
/// ```
pub fn map_range(value: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    let value = value.min(in_max).max(in_min);
    if in_max == in_min {
        return out_min;
    }
    let scaled = (f64::from(value) - f64::from(in_min)) * (f64::from(out_max) - f64::from(out_min))
        / (f64::from(in_max) - f64::from(in_min))
        + f64::from(out_min);
    scaled as i32
}

/// 指数平滑：`current + floor((target - current) * factor)`
pub fn smooth(current: i32, target: i32, factor: f64) -> i32 {
    let step = ((f64::from(target) - f64::from(current)) * factor).floor();
    (f64::from(current) + step) as i32
}

/// 舵机位置（角度域）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorPosition {
    pub x: i32,
    pub y: i32,
}

impl ActuatorPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// 运动参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// 舵机最小角度
    pub servo_min: i32,
    /// 舵机最大角度
    pub servo_max: i32,
    /// 平滑系数（每周期覆盖剩余距离的比例）
    pub smoothing: f64,
    /// 启动时的静止角度
    pub rest: i32,
    /// 可视化叠加层到画面边缘的留白（像素）
    pub overlay_margin: i32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            servo_min: 10,
            servo_max: 170,
            smoothing: 0.2,
            rest: 90,
            overlay_margin: 100,
        }
    }
}

/// 运动滤波器
///
/// 唯一持有 [`ActuatorPosition`] 的对象，只由跟踪循环修改。
#[derive(Debug, Clone)]
pub struct MotionFilter {
    config: MotionConfig,
    position: ActuatorPosition,
}

impl MotionFilter {
    pub fn new(config: MotionConfig) -> Self {
        let position = ActuatorPosition::new(config.rest, config.rest);
        Self { config, position }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// 当前（上一次输出的）位置
    pub fn position(&self) -> ActuatorPosition {
        self.position
    }

    /// 回到静止角度
    pub fn reset(&mut self) {
        self.position = ActuatorPosition::new(self.config.rest, self.config.rest);
    }

    /// 目标像素点对应的期望角度（未平滑）
    ///
    /// 目标先截断到画面内，y 轴再镜像（`height - y`），使画面中的"上"对应舵机的"上"。
    pub fn desired(&self, target: TargetPoint, frame: FrameSize) -> ActuatorPosition {
        let (w, h) = frame.as_i32();
        let x = target.x.clamp(0, w);
        let y = target.y.clamp(0, h);
        let c = &self.config;
        ActuatorPosition::new(
            map_range(x, 0, w, c.servo_min, c.servo_max),
            map_range(h - y, 0, h, c.servo_min, c.servo_max),
        )
    }

    /// 推进一个周期并返回新位置
    pub fn update(&mut self, target: TargetPoint, frame: FrameSize) -> ActuatorPosition {
        let desired = self.desired(target, frame);
        let factor = self.config.smoothing;
        self.position = ActuatorPosition::new(
            smooth(self.position.x, desired.x, factor),
            smooth(self.position.y, desired.y, factor),
        );
        self.position
    }

    /// 当前角度在画面中的叠加点（仅用于显示）
    pub fn overlay(&self, frame: FrameSize) -> (i32, i32) {
        let (w, h) = frame.as_i32();
        let c = &self.config;
        (
            map_range(
                self.position.x,
                c.servo_min,
                c.servo_max,
                c.overlay_margin,
                w.saturating_sub(c.overlay_margin),
            ),
            map_range(
                self.position.y,
                c.servo_min,
                c.servo_max,
                c.overlay_margin,
                h.saturating_sub(c.overlay_margin),
            ),
        )
    }
}

impl Default for MotionFilter {
    fn default() -> Self {
        Self::new(MotionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{BoundingBox, NormalizedPoint, Observation, TargetSource};
    use proptest::prelude::*;

    const FRAME: FrameSize = FrameSize::new(640, 480);

    fn point(x: i32, y: i32) -> TargetPoint {
        TargetPoint::new(x, y, TargetSource::Hand)
    }

    #[test]
    fn test_map_range_basic() {
        assert_eq!(map_range(0, 0, 640, 10, 170), 10);
        assert_eq!(map_range(640, 0, 640, 10, 170), 170);
        assert_eq!(map_range(320, 0, 640, 10, 170), 90);
        // 向零截断：1 * 160 / 640 = 0.25
        assert_eq!(map_range(1, 0, 640, 10, 170), 10);
    }

    #[test]
    fn test_map_range_clamps() {
        assert_eq!(map_range(-100, 0, 640, 10, 170), 10);
        assert_eq!(map_range(9000, 0, 640, 10, 170), 170);
    }

    #[test]
    fn test_map_range_reversed_output() {
        assert_eq!(map_range(0, 0, 100, 100, 0), 100);
        assert_eq!(map_range(100, 0, 100, 100, 0), 0);
        assert_eq!(map_range(25, 0, 100, 100, 0), 75);
    }

    #[test]
    fn test_smooth_floor() {
        assert_eq!(smooth(90, 170, 0.2), 106);
        assert_eq!(smooth(90, 10, 0.2), 74);
        // 负方向向下取整，会一直走到目标
        assert_eq!(smooth(11, 10, 0.2), 10);
        // 正方向剩余距离小于 1/factor 时停住
        assert_eq!(smooth(10, 14, 0.2), 10);
        assert_eq!(smooth(50, 50, 0.2), 50);
    }

    #[test]
    fn test_filter_starts_at_rest() {
        let filter = MotionFilter::default();
        assert_eq!(filter.position(), ActuatorPosition::new(90, 90));
    }

    #[test]
    fn test_desired_mirrors_y() {
        let filter = MotionFilter::default();
        // 画面顶部 → 舵机上限
        assert_eq!(filter.desired(point(320, 0), FRAME), ActuatorPosition::new(90, 170));
        assert_eq!(filter.desired(point(0, 480), FRAME), ActuatorPosition::new(10, 10));
    }

    #[test]
    fn test_extreme_detections_clamp_to_servo_range() {
        let filter = MotionFilter::default();
        let cases = [
            (NormalizedPoint::new(0.5, -1e10), ActuatorPosition::new(90, 170)),
            (NormalizedPoint::new(0.5, 1e10), ActuatorPosition::new(90, 10)),
            (NormalizedPoint::new(-1e10, 0.5), ActuatorPosition::new(10, 90)),
            (NormalizedPoint::new(1e10, 2.0), ActuatorPosition::new(170, 10)),
            (NormalizedPoint::new(f64::INFINITY, f64::NEG_INFINITY), ActuatorPosition::new(170, 170)),
            (NormalizedPoint::new(-0.25, 1.25), ActuatorPosition::new(10, 10)),
        ];
        for (palm, expected) in cases {
            let observation = Observation::empty(FRAME).with_hand(vec![palm]);
            let target = TargetPoint::select(&observation);
            assert_eq!(filter.desired(target, FRAME), expected, "palm {palm:?}");
        }

        let face = BoundingBox {
            xmin: -5e9,
            ymin: 5e9,
            width: 1.0,
            height: 1.0,
        };
        let target = TargetPoint::select(&Observation::empty(FRAME).with_face(face));
        assert_eq!(filter.desired(target, FRAME), ActuatorPosition::new(10, 10));
    }

    #[test]
    fn test_extreme_pixel_targets_do_not_overflow() {
        let mut filter = MotionFilter::default();
        for target in [point(i32::MIN, i32::MIN), point(i32::MAX, i32::MAX), point(i32::MIN, i32::MAX)] {
            let position = filter.update(target, FRAME);
            assert!((10..=170).contains(&position.x));
            assert!((10..=170).contains(&position.y));
        }
        let huge = FrameSize::new(u32::MAX, u32::MAX);
        let position = filter.desired(point(i32::MAX, 0), huge);
        assert_eq!(position, ActuatorPosition::new(170, 170));
    }

    #[test]
    fn test_update_moves_toward_target() {
        let mut filter = MotionFilter::default();
        let first = filter.update(point(640, 0), FRAME);
        assert_eq!(first, ActuatorPosition::new(106, 106));
        let second = filter.update(point(640, 0), FRAME);
        assert_eq!(second, ActuatorPosition::new(118, 118));
    }

    #[test]
    fn test_centre_target_holds_rest() {
        let mut filter = MotionFilter::default();
        for _ in 0..10 {
            assert_eq!(filter.update(point(320, 240), FRAME), ActuatorPosition::new(90, 90));
        }
    }

    #[test]
    fn test_overlay() {
        let mut filter = MotionFilter::default();
        assert_eq!(filter.overlay(FRAME), (320, 240));
        for _ in 0..100 {
            filter.update(point(0, 480), FRAME);
        }
        assert_eq!(filter.position(), ActuatorPosition::new(10, 10));
        assert_eq!(filter.overlay(FRAME), (100, 100));
        filter.reset();
        assert_eq!(filter.position(), ActuatorPosition::new(90, 90));
    }

    proptest! {
        #[test]
        fn prop_map_monotonic(a in -1000i32..2000, b in -1000i32..2000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(map_range(lo, 0, 640, 10, 170) <= map_range(hi, 0, 640, 10, 170));
        }

        #[test]
        fn prop_map_clamped(v in -100_000i32..100_000) {
            let out = map_range(v, 0, 640, 10, 170);
            prop_assert!((10..=170).contains(&out));
            if v <= 0 {
                prop_assert_eq!(out, 10);
            }
            if v >= 640 {
                prop_assert_eq!(out, 170);
            }
        }

        #[test]
        fn prop_map_degenerate(v in -100_000i32..100_000, edge in -500i32..500) {
            prop_assert_eq!(map_range(v, edge, edge, 10, 170), 10);
        }

        #[test]
        fn prop_any_detection_stays_in_servo_range(
            x in -1e12f64..1e12,
            y in -1e12f64..1e12,
            steps in 1usize..20,
        ) {
            let observation = Observation::empty(FRAME).with_hand(vec![NormalizedPoint::new(x, y)]);
            let target = TargetPoint::select(&observation);
            let mut filter = MotionFilter::default();
            let desired = filter.desired(target, FRAME);
            prop_assert!((10..=170).contains(&desired.x));
            prop_assert!((10..=170).contains(&desired.y));
            for _ in 0..steps {
                let position = filter.update(target, FRAME);
                prop_assert!((10..=170).contains(&position.x));
                prop_assert!((10..=170).contains(&position.y));
            }
        }

        #[test]
        fn prop_smooth_converges(start in 10i32..=170, target in 10i32..=170) {
            let mut current = start;
            for _ in 0..200 {
                let next = smooth(current, target, 0.2);
                let before = (target - current).abs();
                let after = (target - next).abs();
                // 不越过目标，距离单调不增
                prop_assert!(after <= before);
                prop_assert!((next - target).signum() * (current - target).signum() >= 0);
                if next == current {
                    break;
                }
                prop_assert!(after < before);
                current = next;
            }
            // 不动点在取整误差之内
            prop_assert!((target - current).abs() < 5);
            prop_assert_eq!(smooth(current, target, 0.2), current);
        }
    }
}
