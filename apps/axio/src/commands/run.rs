//! 运行控制循环
//!
//! 线程布局：
//! - 主线程：跟踪循环（感知节奏驱动）
//! - `axio-blink`：眨眼调度
//! - `axio-voice`：语音命令（阻塞在输入上，退出时不等待）
//! - `axio-speech`：语音输出
//!
//! Ctrl-C 或感知源关闭时，跟踪循环让眼球休眠并关闭链路，其余线程随停止信号退出。

use super::open_link;
use crate::collaborators::{
    ConsoleSpeaker, EspeakSpeaker, LineListener, OpenAiChat, SimulatedPerception, UdpPerception,
};
use crate::config::{AxioConfig, PerceptionSource};
use anyhow::{Context, Result};
use axio_sdk::control::{Perception, SpeechOutput, Tracker, VoiceDispatcher, speech_channel};
use axio_sdk::driver::{BlinkScheduler, DeviceState, StopSignal};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// 运行参数
#[derive(Args, Debug, Default)]
pub struct RunCommand {
    /// 使用内置模拟目标代替 UDP 感知源
    #[arg(long)]
    pub simulate: bool,

    /// 不启动语音命令线程
    #[arg(long)]
    pub no_voice: bool,

    /// 语音只打印到终端，不调用合成器
    #[arg(long)]
    pub console_speech: bool,
}

impl RunCommand {
    pub fn execute(self, config: AxioConfig, dry_run: bool) -> Result<()> {
        config.tracking.validate()?;

        let perception = self.open_perception(&config)?;
        let link = Arc::new(open_link(&config, dry_run));
        let state = Arc::new(DeviceState::new(config.voice.history_max_turns));
        let stop = StopSignal::new();

        {
            let stop = stop.clone();
            ctrlc::set_handler(move || {
                eprintln!("\nReceived interrupt signal. Shutting down...");
                stop.stop();
            })
            .context("Failed to install Ctrl-C handler")?;
        }

        let speaker: Box<dyn SpeechOutput> =
            if self.console_speech || config.speech.program.trim().is_empty() {
                Box::new(ConsoleSpeaker)
            } else {
                Box::new(EspeakSpeaker::new(config.speech.clone()))
            };
        let (speech, speech_worker) = speech_channel(speaker);
        let speech_thread = speech_worker
            .spawn(stop.clone())
            .context("Failed to spawn speech thread")?;

        let blink_thread = BlinkScheduler::new(link.clone(), state.clone(), config.blink.clone())?
            .spawn(stop.clone())
            .context("Failed to spawn blink thread")?;

        if self.no_voice {
            info!("Voice commands disabled");
        } else {
            let chat = OpenAiChat::new(config.chat.clone())?;
            if !chat.has_api_key() {
                warn!(
                    "{} is not set; conversation replies will report the error",
                    config.chat.api_key_env
                );
            }
            let dispatcher = VoiceDispatcher::new(
                link.clone(),
                state.clone(),
                chat,
                speech.clone(),
                config.voice.clone(),
            );
            // 阻塞在标准输入上，进程退出时直接丢弃
            let _voice = dispatcher.spawn(LineListener::stdin(), stop.clone())?;
            info!("Type an utterance per line; say 'hey axio' to wake");
        }

        let tracker = Tracker::new(link.clone(), state.clone(), perception, config.tracking.clone())?;
        tracker.run(stop.clone());

        if blink_thread.join().is_err() {
            warn!("Blink thread panicked");
        }
        if speech_thread.join().is_err() {
            warn!("Speech thread panicked");
        }

        let metrics = link.metrics().snapshot();
        let speech_stats = speech.stats();
        info!(
            "Sent {} commands ({} positions), dropped {}, {} I/O errors, {} ack timeouts",
            metrics.commands_sent,
            metrics.positions_sent,
            metrics.commands_dropped,
            metrics.io_errors,
            metrics.ack_timeouts
        );
        info!(
            "Spoke {} utterances, dropped {} stale ones",
            speech_stats.spoken, speech_stats.dropped
        );
        Ok(())
    }

    fn open_perception(&self, config: &AxioConfig) -> Result<Box<dyn Perception>> {
        let section = &config.perception;
        let source = if self.simulate {
            PerceptionSource::Simulated
        } else {
            section.source
        };

        Ok(match source {
            PerceptionSource::Simulated => {
                info!("Using simulated perception");
                Box::new(SimulatedPerception::new(
                    config.tracking.frame(),
                    Duration::from_millis(section.frame_interval_ms),
                ))
            },
            PerceptionSource::Udp => Box::new(
                UdpPerception::bind(&section.bind, Duration::from_millis(section.frame_timeout_ms))
                    .with_context(|| format!("Failed to bind perception socket {}", section.bind))?,
            ),
        })
    }
}
