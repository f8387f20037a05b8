//! Mock 链路（无硬件依赖）
//!
//! 模拟执行器固件：记录所有写入的字节，可预置上行行，也可以按命令自动回复
//! （例如收到 `WAKE` 后回 `AWAKE`）。`MockLink` 的克隆共享同一条"线"，
//! 测试代码持有一个克隆即可检查另一端写入了什么。

use crate::{LinkAdapter, LinkError};
use axio_protocol::{ACK_ASLEEP, ACK_AWAKE, Command};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct Wire {
    written: Vec<u8>,
    inbound: VecDeque<String>,
    replies: Vec<(Command, String)>,
    reply_to_positions: Option<String>,
    broken: bool,
    byte_delay: Option<Duration>,
    clears: usize,
}

/// 内存 Mock 链路
#[derive(Clone, Default)]
pub struct MockLink {
    wire: Arc<Mutex<Wire>>,
}

impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 模拟一块正常的固件：WAKE 回 `AWAKE`，SLEEP 回 `ASLEEP`
    pub fn with_firmware_acks() -> Self {
        let link = Self::new();
        link.auto_reply(Command::Wake, ACK_AWAKE);
        link.auto_reply(Command::Sleep, ACK_ASLEEP);
        link
    }

    /// 收到 `command` 后自动推送一条上行行
    pub fn auto_reply(&self, command: Command, reply: &str) {
        self.wire.lock().replies.push((command, reply.to_string()));
    }

    /// 收到任意位置命令后自动推送一条上行行（用于制造噪声）
    pub fn auto_reply_to_positions(&self, reply: &str) {
        self.wire.lock().reply_to_positions = Some(reply.to_string());
    }

    /// 预置一条上行行
    pub fn push_line(&self, line: &str) {
        self.wire.lock().inbound.push_back(line.to_string());
    }

    /// 模拟设备断开：之后所有读写都返回错误
    pub fn set_broken(&self, broken: bool) {
        self.wire.lock().broken = broken;
    }

    /// 逐字节写入并在字节之间休眠，放大并发写入交错的窗口
    pub fn set_byte_delay(&self, delay: Duration) {
        self.wire.lock().byte_delay = Some(delay);
    }

    /// 已写入的原始字节
    pub fn written_bytes(&self) -> Vec<u8> {
        self.wire.lock().written.clone()
    }

    /// 已写入的行（不含行结束符）
    pub fn written_lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.wire.lock().written)
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// 已写入的命令（无法解析的行被跳过）
    pub fn written_commands(&self) -> Vec<Command> {
        self.written_lines()
            .iter()
            .filter_map(|line| line.parse().ok())
            .collect()
    }

    /// `clear_input` 被调用的次数
    pub fn clear_count(&self) -> usize {
        self.wire.lock().clears
    }

    /// 清空写入记录
    pub fn take_written(&self) -> Vec<String> {
        let lines = self.written_lines();
        self.wire.lock().written.clear();
        lines
    }

    fn broken_error() -> LinkError {
        LinkError::Io(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "mock link disconnected",
        ))
    }
}

impl LinkAdapter for MockLink {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        let delay = {
            let wire = self.wire.lock();
            if wire.broken {
                return Err(Self::broken_error());
            }
            wire.byte_delay
        };

        match delay {
            Some(delay) => {
                for &b in bytes {
                    self.wire.lock().written.push(b);
                    std::thread::sleep(delay);
                }
            },
            None => self.wire.lock().written.extend_from_slice(bytes),
        }

        let text = String::from_utf8_lossy(bytes);
        let mut wire = self.wire.lock();
        for line in text.lines() {
            let Ok(command) = line.parse::<Command>() else {
                continue;
            };
            let mut replies: Vec<String> = wire
                .replies
                .iter()
                .filter(|(c, _)| *c == command)
                .map(|(_, r)| r.clone())
                .collect();
            if command.is_position()
                && let Some(reply) = wire.reply_to_positions.clone()
            {
                replies.push(reply);
            }
            wire.inbound.extend(replies);
        }
        Ok(())
    }

    fn poll_line(&mut self) -> Result<Option<String>, LinkError> {
        let mut wire = self.wire.lock();
        if wire.broken {
            return Err(Self::broken_error());
        }
        Ok(wire.inbound.pop_front())
    }

    fn clear_input(&mut self) -> Result<(), LinkError> {
        let mut wire = self.wire.lock();
        if wire.broken {
            return Err(Self::broken_error());
        }
        wire.inbound.clear();
        wire.clears += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
