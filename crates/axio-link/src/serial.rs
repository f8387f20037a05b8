//! USB 串口适配器
//!
//! 基于 `serialport`，读取采用"有多少读多少"的非阻塞方式，
//! 由 [`LineDecoder`] 负责拼接跨读取的行。

use crate::{LinkAdapter, LinkError};
use axio_protocol::LineDecoder;
use serialport::{ClearBuffer, SerialPort};
use std::io::{ErrorKind, Read, Write};
use std::time::Duration;
use tracing::{debug, info};

/// 单次读取的最大字节数
const READ_CHUNK: usize = 256;

/// 串口链路
pub struct SerialLink {
    port: Box<dyn SerialPort>,
    decoder: LineDecoder,
    name: String,
}

impl SerialLink {
    /// 打开串口
    ///
    /// # 参数
    /// - `path`: 设备路径（如 `/dev/ttyUSB0`、`COM6`）
    /// - `baud`: 波特率（参考固件为 9600）
    /// - `read_timeout`: 底层读超时
    pub fn open(path: &str, baud: u32, read_timeout: Duration) -> Result<Self, LinkError> {
        let port = serialport::new(path, baud)
            .timeout(read_timeout)
            .open()
            .map_err(|e| LinkError::Open {
                port: path.to_string(),
                message: e.to_string(),
            })?;
        info!("Opened serial link {} at {} baud", path, baud);
        Ok(Self::from_port(port, path))
    }

    /// 包装一个已打开的串口
    pub fn from_port(port: Box<dyn SerialPort>, name: impl Into<String>) -> Self {
        Self {
            port,
            decoder: LineDecoder::new(),
            name: name.into(),
        }
    }
}

impl LinkAdapter for SerialLink {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        self.port.write_all(bytes)?;
        self.port.flush()?;
        Ok(())
    }

    fn poll_line(&mut self) -> Result<Option<String>, LinkError> {
        if let Some(line) = self.decoder.next_line() {
            return Ok(Some(line));
        }

        let available = self.port.bytes_to_read()? as usize;
        if available == 0 {
            return Ok(None);
        }

        let mut buf = [0u8; READ_CHUNK];
        let want = available.min(READ_CHUNK);
        match self.port.read(&mut buf[..want]) {
            Ok(n) => self.decoder.push(&buf[..n]),
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {},
            Err(e) => return Err(e.into()),
        }
        Ok(self.decoder.next_line())
    }

    fn clear_input(&mut self) -> Result<(), LinkError> {
        self.port.clear(ClearBuffer::Input)?;
        if self.decoder.pending_len() > 0 {
            debug!(
                "Discarding {} buffered bytes from {}",
                self.decoder.pending_len(),
                self.name
            );
        }
        self.decoder.clear();
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
