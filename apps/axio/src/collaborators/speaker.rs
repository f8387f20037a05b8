//! 语音合成
//!
//! `EspeakSpeaker` 每句话启动一次合成器进程并等待其结束；
//! `ConsoleSpeaker` 只打印，用于没有合成器的环境。

use crate::config::SpeechSection;
use axio_sdk::control::{SpeakError, SpeechOutput};
use rand::Rng;
use std::process::{Command, Stdio};
use tracing::debug;

/// espeak-ng 合成器
pub struct EspeakSpeaker {
    config: SpeechSection,
}

impl EspeakSpeaker {
    pub fn new(config: SpeechSection) -> Self {
        Self { config }
    }

    /// 构建一次发声的命令行参数（音高、语速随机，文本经过机器人修饰）
    pub fn arguments<R: Rng + ?Sized>(&self, rng: &mut R, text: &str) -> Vec<String> {
        let pitch = self.config.pitch.draw(rng);
        let speed = self.config.speed.draw(rng);
        let decorated = self.config.effects.apply_with(rng, text);

        let mut args = Vec::with_capacity(9);
        if let Some(path) = &self.config.data_path {
            args.push("--path".to_string());
            args.push(path.clone());
        }
        args.extend([
            "-v".to_string(),
            self.config.voice.clone(),
            "-s".to_string(),
            speed.to_string(),
            "-p".to_string(),
            pitch.to_string(),
            decorated,
        ]);
        args
    }
}

impl SpeechOutput for EspeakSpeaker {
    fn speak(&mut self, text: &str) -> Result<(), SpeakError> {
        let args = self.arguments(&mut rand::thread_rng(), text);
        debug!("{} {:?}", self.config.program, args);

        let status = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()?;
        if !status.success() {
            return Err(SpeakError::Exit(status.to_string()));
        }
        Ok(())
    }
}

/// 终端输出
#[derive(Debug, Default)]
pub struct ConsoleSpeaker;

impl SpeechOutput for ConsoleSpeaker {
    fn speak(&mut self, text: &str) -> Result<(), SpeakError> {
        println!("Axio: {text}");
        Ok(())
    }
}
