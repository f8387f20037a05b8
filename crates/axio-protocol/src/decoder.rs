//! 上行字节流行解码器
//!
//! 串口读取是按块到达的，一行可能被拆成多次读取，一次读取也可能包含多行。
//! `LineDecoder` 负责缓存不完整的行，并在遇到 `\n` 时产出完整行。

/// 单行最大缓存长度（字节）
///
/// 超过该长度仍未见到行结束符时，视为噪声并丢弃缓存。
pub const DEFAULT_MAX_LINE: usize = 256;

/// 行解码器
///
/// # Example
///
/// ```
/// use axio_protocol::LineDecoder;
///
/// let mut decoder = LineDecoder::new();
/// decoder.push(b"AWA");
/// assert_eq!(decoder.next_line(), None);
/// decoder.push(b"KE\r\n");
/// assert_eq!(decoder.next_line().as_deref(), Some("AWAKE"));
/// ```
#[derive(Debug, Clone)]
pub struct LineDecoder {
    buf: Vec<u8>,
    max_line: usize,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::with_max_line(DEFAULT_MAX_LINE)
    }

    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            buf: Vec::with_capacity(max_line.min(1024)),
            max_line,
        }
    }

    /// 追加新读到的字节
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);

        // 没有行结束符且超长：丢弃旧数据，只保留最后 max_line 字节
        if !self.buf.contains(&b'\n') && self.buf.len() > self.max_line {
            let excess = self.buf.len() - self.max_line;
            self.buf.drain(..excess);
        }
    }

    /// 取出下一条非空的完整行（去除首尾空白，非法 UTF-8 以替换字符代替）
    pub fn next_line(&mut self) -> Option<String> {
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw).trim().to_string();
            if !line.is_empty() {
                return Some(line);
            }
        }
        None
    }

    /// 当前缓存的不完整字节数
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }

    /// 丢弃所有缓存
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiple_lines_in_one_chunk() {
        let mut decoder = LineDecoder::new();
        decoder.push(b"hello\nAWAKE\r\npartial");
        assert_eq!(decoder.next_line().as_deref(), Some("hello"));
        assert_eq!(decoder.next_line().as_deref(), Some("AWAKE"));
        assert_eq!(decoder.next_line(), None);
        assert_eq!(decoder.pending_len(), "partial".len());
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let mut decoder = LineDecoder::new();
        decoder.push(b"\r\n\n   \nASLEEP\n");
        assert_eq!(decoder.next_line().as_deref(), Some("ASLEEP"));
        assert_eq!(decoder.next_line(), None);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut decoder = LineDecoder::new();
        decoder.push(&[0xFF, b'o', b'k', b'\n']);
        let line = decoder.next_line().unwrap();
        assert!(line.ends_with("ok"));
    }

    #[test]
    fn test_overlong_garbage_is_bounded() {
        let mut decoder = LineDecoder::with_max_line(8);
        decoder.push(&[b'x'; 100]);
        assert_eq!(decoder.pending_len(), 8);
        decoder.push(b"\n");
        assert_eq!(decoder.next_line().as_deref(), Some("xxxxxxxx"));
    }

    #[test]
    fn test_clear() {
        let mut decoder = LineDecoder::new();
        decoder.push(b"AWAKE\n");
        decoder.clear();
        assert_eq!(decoder.next_line(), None);
        assert_eq!(decoder.pending_len(), 0);
    }
}
