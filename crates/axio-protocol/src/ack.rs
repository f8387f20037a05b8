//! 握手应答匹配
//!
//! 执行器在完成 WAKE/SLEEP 后回写一行确认文本。固件版本之间措辞不完全一致
//! （例如 `AWAKE`、`eyes awake`、`[ok] awake`），所以只做忽略大小写的子串匹配。

/// WAKE 命令的应答子串
pub const ACK_AWAKE: &str = "AWAKE";

/// SLEEP 命令的应答子串
pub const ACK_ASLEEP: &str = "ASLEEP";

/// 判断一行应答是否包含期望的子串（忽略大小写）
///
/// # Example
///
/// ```
/// use axio_protocol::ack_matches;
///
/// assert!(ack_matches("eyes awake", "AWAKE"));
/// assert!(!ack_matches("BLINK done", "AWAKE"));
/// ```
pub fn ack_matches(line: &str, expected: &str) -> bool {
    line.to_uppercase().contains(&expected.to_uppercase())
}
