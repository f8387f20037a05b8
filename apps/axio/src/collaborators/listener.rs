//! 文本行输入
//!
//! 每行视为一句已转写的发言（可接终端、管道或外部识别进程的输出）。
//! 空行表示"没听懂"，EOF 表示输入关闭。

use axio_sdk::control::{ListenError, SpeechInput};
use std::io::{BufRead, BufReader, Stdin};

/// 行输入监听器
pub struct LineListener<R> {
    reader: R,
    line: String,
}

impl LineListener<BufReader<Stdin>> {
    /// 从标准输入读取
    pub fn stdin() -> Self {
        Self::new(BufReader::new(std::io::stdin()))
    }
}

impl<R: BufRead> LineListener<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
        }
    }
}

impl<R: BufRead + Send> SpeechInput for LineListener<R> {
    fn listen(&mut self) -> Result<String, ListenError> {
        self.line.clear();
        match self.reader.read_line(&mut self.line) {
            Ok(0) => Err(ListenError::Closed),
            Ok(_) => {
                let text = self.line.trim().to_lowercase();
                if text.is_empty() {
                    Err(ListenError::NoSpeech)
                } else {
                    Ok(text)
                }
            },
            Err(e) => Err(ListenError::Service(e.to_string())),
        }
    }
}
