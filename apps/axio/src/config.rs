//! 配置文件
//!
//! 默认路径为 `<config_dir>/axio/config.toml`，所有字段都有默认值，
//! 文件不存在或缺少某个段时使用参考行为。

use anyhow::{Context, Result};
use axio_sdk::control::{TrackingConfig, VoiceConfig};
use axio_sdk::driver::{BlinkConfig, LinkConfig};
use axio_sdk::tools::{RoboticEffects, VoiceRange};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 默认配置文件路径
pub fn default_config_file() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push("axio");
    path.push("config.toml");
    Some(path)
}

/// 串口链路配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkSection {
    pub port: String,
    pub baud: u32,
    pub read_timeout_ms: u64,
    /// 打开串口后等待控制器复位的时间
    pub open_settle_ms: u64,
    #[serde(flatten)]
    pub handshake: LinkConfig,
}

impl Default for LinkSection {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud: 9600,
            read_timeout_ms: 200,
            open_settle_ms: 2000,
            handshake: LinkConfig::default(),
        }
    }
}

impl LinkSection {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn open_settle(&self) -> Duration {
        Duration::from_millis(self.open_settle_ms)
    }
}

/// AI 对话配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSection {
    /// Responses API 地址
    pub endpoint: String,
    pub model: String,
    /// 保存 API key 的环境变量名
    pub api_key_env: String,
    pub timeout_s: u64,
    pub reasoning_effort: String,
    pub verbosity: String,
}

impl Default for ChatSection {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/responses".to_string(),
            model: "gpt-5-nano".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_s: 30,
            reasoning_effort: "medium".to_string(),
            verbosity: "medium".to_string(),
        }
    }
}

/// 语音合成配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSection {
    /// 合成器程序；为空时只打印到终端
    pub program: String,
    /// 合成器数据目录（`--path`）
    pub data_path: Option<String>,
    pub voice: String,
    pub pitch: VoiceRange,
    pub speed: VoiceRange,
    pub effects: RoboticEffects,
}

impl Default for SpeechSection {
    fn default() -> Self {
        Self {
            program: "espeak-ng".to_string(),
            data_path: None,
            voice: "en+f3".to_string(),
            pitch: VoiceRange::new(30, 40),
            speed: VoiceRange::new(120, 130),
            effects: RoboticEffects::default(),
        }
    }
}

/// 感知源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerceptionSource {
    /// 外部检测进程通过 UDP 推送 JSON 观测
    Udp,
    /// 内置模拟目标
    Simulated,
}

/// 感知配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionSection {
    pub source: PerceptionSource,
    /// UDP 监听地址
    pub bind: String,
    /// 等待一帧的最长时间，超时视为无帧
    pub frame_timeout_ms: u64,
    /// 模拟感知的帧间隔
    pub frame_interval_ms: u64,
}

impl Default for PerceptionSection {
    fn default() -> Self {
        Self {
            source: PerceptionSource::Udp,
            bind: "127.0.0.1:5005".to_string(),
            frame_timeout_ms: 100,
            frame_interval_ms: 33,
        }
    }
}

/// 完整配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AxioConfig {
    pub link: LinkSection,
    pub tracking: TrackingConfig,
    pub blink: BlinkConfig,
    pub voice: VoiceConfig,
    pub chat: ChatSection,
    pub speech: SpeechSection,
    pub perception: PerceptionSection,
}

impl AxioConfig {
    /// 解析 TOML 文本
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse configuration")
    }

    /// 加载配置
    ///
    /// 显式指定的文件必须存在；默认路径不存在时返回默认配置。
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let (path, required) = match explicit {
            Some(path) => (Some(path.to_path_buf()), true),
            None => (default_config_file(), false),
        };

        let Some(path) = path else {
            return Ok((Self::default(), None));
        };
        if !required && !path.exists() {
            return Ok((Self::default(), None));
        }

        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::from_toml(&text).with_context(|| format!("In {}", path.display()))?;
        Ok((config, Some(path)))
    }

    /// 序列化为 TOML（`config show`）
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// 命令行覆盖
    pub fn apply_overrides(&mut self, port: Option<&str>, baud: Option<u32>) {
        if let Some(port) = port {
            self.link.port = port.to_string();
        }
        if let Some(baud) = baud {
            self.link.baud = baud;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_reference_values() {
        let config = AxioConfig::from_toml("").unwrap();
        assert_eq!(config.link.port, "/dev/ttyUSB0");
        assert_eq!(config.link.baud, 9600);
        assert_eq!(config.link.handshake.ack_timeout_ms, 1500);
        assert_eq!(config.tracking.motion.servo_min, 10);
        assert_eq!(config.tracking.motion.servo_max, 170);
        assert_eq!(config.blink.interval_max_ms, 5000);
        assert_eq!(config.voice.history_max_turns, 8);
        assert_eq!(config.voice.max_reply_sentences, 2);
        assert_eq!(config.chat.model, "gpt-5-nano");
        assert_eq!(config.speech.pitch, VoiceRange::new(30, 40));
        assert_eq!(config.perception.source, PerceptionSource::Udp);
    }

    #[test]
    fn test_partial_sections() {
        let text = r#"
[link]
port = "COM6"
ack_timeout_ms = 800

[tracking]
smoothing = 0.5
frame_width = 1280

[voice.phrases]
wake = ["wake up axio"]

[speech.effects]
stutter_chance = 0.0

[perception]
source = "simulated"
"#;
        let config = AxioConfig::from_toml(text).unwrap();
        assert_eq!(config.link.port, "COM6");
        assert_eq!(config.link.baud, 9600);
        assert_eq!(config.link.handshake.ack_timeout_ms, 800);
        assert_eq!(config.link.handshake.ack_poll_ms, 10);
        assert_eq!(config.tracking.motion.smoothing, 0.5);
        assert_eq!(config.tracking.frame_width, 1280);
        assert_eq!(config.voice.phrases.wake, vec!["wake up axio".to_string()]);
        assert_eq!(config.voice.phrases.sleep.len(), 3);
        assert_eq!(config.speech.effects.stutter_chance, 0.0);
        assert_eq!(config.speech.effects.ellipsis_chance, 0.02);
        assert_eq!(config.perception.source, PerceptionSource::Simulated);
    }

    #[test]
    fn test_show_output_parses_back() {
        let mut config = AxioConfig::default();
        config.apply_overrides(Some("/dev/ttyACM0"), Some(115_200));
        let text = config.to_toml().unwrap();
        assert_eq!(AxioConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_unknown_source_rejected() {
        assert!(AxioConfig::from_toml("[perception]\nsource = \"webcam\"").is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let missing = Path::new("/nonexistent/axio/config.toml");
        assert!(AxioConfig::load(Some(missing)).is_err());
    }
}
