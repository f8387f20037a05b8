//! 机器人语音修饰
//!
//! 在文本送入语音合成器之前，按词随机插入口吃、逐字母拼读和停顿标点，
//! 并为每次发声随机选择音高与语速。

use rand::Rng;
use serde::{Deserialize, Serialize};

/// 闭区间整数范围（音高、语速）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceRange {
    pub min: u32,
    pub max: u32,
}

impl VoiceRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// 在区间内均匀抽取一个值（上下界颠倒时自动交换）
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let (lo, hi) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        rng.gen_range(lo..=hi)
    }
}

/// 修饰概率配置
///
/// 三种停顿标点共用一次抽样：依次落入 `ellipsis`、`period`、`comma` 的累积区间。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoboticEffects {
    /// 重复当前词
    pub stutter_chance: f64,
    /// 逐字母拼读（仅长度大于 2 的词）
    pub letter_split_chance: f64,
    /// 追加 `...`
    pub ellipsis_chance: f64,
    /// 追加 `.`
    pub period_chance: f64,
    /// 追加 `,`
    pub comma_chance: f64,
}

impl Default for RoboticEffects {
    fn default() -> Self {
        Self {
            stutter_chance: 0.05,
            letter_split_chance: 0.01,
            ellipsis_chance: 0.02,
            period_chance: 0.01,
            comma_chance: 0.01,
        }
    }
}

impl RoboticEffects {
    /// 不做任何修饰
    pub fn none() -> Self {
        Self {
            stutter_chance: 0.0,
            letter_split_chance: 0.0,
            ellipsis_chance: 0.0,
            period_chance: 0.0,
            comma_chance: 0.0,
        }
    }

    /// 使用线程本地随机源修饰文本
    pub fn apply(&self, text: &str) -> String {
        self.apply_with(&mut rand::thread_rng(), text)
    }

    /// 使用指定随机源修饰文本
    ///
    /// 词按空白切分，结果以单个空格连接。
    pub fn apply_with<R: Rng + ?Sized>(&self, rng: &mut R, text: &str) -> String {
        let mut out: Vec<String> = Vec::new();

        for word in text.split_whitespace() {
            if roll(rng, self.stutter_chance) {
                out.push(word.to_string());
            }

            if roll(rng, self.letter_split_chance) && word.chars().count() > 2 {
                out.extend(word.chars().map(String::from));
            } else {
                out.push(word.to_string());
            }

            let r: f64 = rng.gen_range(0.0..1.0);
            if r < self.ellipsis_chance {
                out.push("...".to_string());
            } else if r < self.ellipsis_chance + self.period_chance {
                out.push(".".to_string());
            } else if r < self.ellipsis_chance + self.period_chance + self.comma_chance {
                out.push(",".to_string());
            }
        }

        out.join(" ")
    }
}

fn roll<R: Rng + ?Sized>(rng: &mut R, chance: f64) -> bool {
    rng.gen_range(0.0..1.0) < chance
}
