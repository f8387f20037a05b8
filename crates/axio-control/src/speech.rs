//! 语音输出工作线程
//!
//! 单个专用线程 + 单槽邮箱：
//! - `say()` 把文本放进邮箱并唤醒工作线程，从不阻塞
//! - 工作线程尚未开始播放的旧句子会被新句子覆盖（latest wins），覆盖次数计入 `dropped`
//! - 正在播放的句子不会被打断
//!
//! 待播放的句子放在 `Mutex<Option<String>>` 中；容量为 1 的通道只负责唤醒，
//! 不携带文本，连续多次 `say()` 最多积压一个唤醒。

use crate::collaborator::SpeechOutput;
use axio_driver::StopSignal;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 工作线程检查停止信号的间隔
const STOP_POLL: Duration = Duration::from_millis(50);

#[derive(Default)]
struct Mailbox {
    slot: Mutex<Option<String>>,
    queued: AtomicU64,
    dropped: AtomicU64,
    spoken: AtomicU64,
    failed: AtomicU64,
}

/// 语音统计快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpeechStats {
    pub queued: u64,
    pub dropped: u64,
    pub spoken: u64,
    pub failed: u64,
}

/// 发送端（可克隆，多个线程共享）
#[derive(Clone)]
pub struct SpeechHandle {
    mailbox: Arc<Mailbox>,
    wake: Sender<()>,
}

impl SpeechHandle {
    /// 投递一句话，立即返回
    ///
    /// 返回 `true` 表示覆盖了一句尚未播放的旧句子。
    pub fn say(&self, text: impl Into<String>) -> bool {
        let text = text.into();
        info!("Axio says: {}", text);

        let replaced = self.mailbox.slot.lock().replace(text);
        self.mailbox.queued.fetch_add(1, Ordering::Relaxed);
        if let Some(old) = &replaced {
            self.mailbox.dropped.fetch_add(1, Ordering::Relaxed);
            debug!("Dropped unspoken utterance: {:?}", old);
        }

        match self.wake.try_send(()) {
            // 已有未处理的唤醒，工作线程会读到最新内容
            Ok(()) | Err(TrySendError::Full(())) => {},
            Err(TrySendError::Disconnected(())) => {
                debug!("Speech worker gone, utterance will not be spoken");
            },
        }
        replaced.is_some()
    }

    /// 是否有尚未开始播放的句子
    pub fn is_pending(&self) -> bool {
        self.mailbox.slot.lock().is_some()
    }

    pub fn stats(&self) -> SpeechStats {
        SpeechStats {
            queued: self.mailbox.queued.load(Ordering::Relaxed),
            dropped: self.mailbox.dropped.load(Ordering::Relaxed),
            spoken: self.mailbox.spoken.load(Ordering::Relaxed),
            failed: self.mailbox.failed.load(Ordering::Relaxed),
        }
    }
}

/// 工作线程
pub struct SpeechWorker<S> {
    output: S,
    mailbox: Arc<Mailbox>,
    wake: Receiver<()>,
}

/// 创建一对 发送端 / 工作线程
pub fn speech_channel<S: SpeechOutput>(output: S) -> (SpeechHandle, SpeechWorker<S>) {
    let mailbox = Arc::new(Mailbox::default());
    let (tx, rx) = crossbeam_channel::bounded(1);
    (
        SpeechHandle {
            mailbox: mailbox.clone(),
            wake: tx,
        },
        SpeechWorker {
            output,
            mailbox,
            wake: rx,
        },
    )
}

impl<S: SpeechOutput> SpeechWorker<S> {
    /// 播放邮箱中的句子（如有）
    ///
    /// 返回是否播放了一句。
    pub fn speak_pending(&mut self) -> bool {
        // 先取出再播放，播放期间不持有邮箱锁
        let Some(text) = self.mailbox.slot.lock().take() else {
            return false;
        };

        match self.output.speak(&text) {
            Ok(()) => {
                self.mailbox.spoken.fetch_add(1, Ordering::Relaxed);
            },
            Err(e) => {
                self.mailbox.failed.fetch_add(1, Ordering::Relaxed);
                warn!("TTS error: {}", e);
            },
        }
        true
    }

    /// 运行直到收到停止信号或所有发送端被释放
    pub fn run(mut self, stop: StopSignal) {
        debug!("Speech worker started");
        while !stop.is_stopped() {
            match self.wake.recv_timeout(STOP_POLL) {
                Ok(()) => {
                    self.speak_pending();
                },
                Err(RecvTimeoutError::Timeout) => {},
                Err(RecvTimeoutError::Disconnected) => {
                    self.speak_pending();
                    break;
                },
            }
        }
        debug!("Speech worker stopped");
    }
}

impl<S: SpeechOutput + 'static> SpeechWorker<S> {
    /// 在独立线程中运行
    pub fn spawn(self, stop: StopSignal) -> std::io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("axio-speech".to_string())
            .spawn(move || self.run(stop))
    }
}
