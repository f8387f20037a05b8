//! 下行命令定义
//!
//! 所有命令都序列化为单行文本，`encode()` 负责追加行结束符。

use crate::ProtocolError;
use crate::ack::{ACK_ASLEEP, ACK_AWAKE};
use std::fmt;
use std::str::FromStr;

/// 行结束符
pub const LINE_TERMINATOR: &str = "\n";

/// 舵机可接受的最大角度（最小为 0）
pub const MAX_ANGLE: i32 = 180;

/// 发送给执行器的命令
///
/// # 线格式
///
/// | 命令 | 文本 |
/// |---|---|
/// | 唤醒（睁眼） | `WAKE` |
/// | 休眠（闭眼） | `SLEEP` |
/// | 眨眼 | `BLINK` |
/// | 眼球位置 | `<x>,<y>`（十进制整数，执行器角度域） |
///
/// 解析位置命令时拒绝 `0..=MAX_ANGLE` 以外的角度。
///
/// # Example
///
/// ```
/// use axio_protocol::Command;
///
/// let cmd = Command::Position { x: 90, y: 120 };
/// assert_eq!(cmd.encode(), "90,120\n");
/// assert_eq!("wake".parse::<Command>().unwrap(), Command::Wake);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    Wake,
    Sleep,
    Blink,
    Position { x: i32, y: i32 },
}

impl Command {
    /// 编码为完整的一行（含行结束符）
    pub fn encode(&self) -> String {
        format!("{self}{LINE_TERMINATOR}")
    }

    /// 该命令握手时期望的应答子串
    ///
    /// 只有 WAKE/SLEEP 使用握手，其余命令只发不等。
    pub fn expected_ack(&self) -> Option<&'static str> {
        match self {
            Command::Wake => Some(ACK_AWAKE),
            Command::Sleep => Some(ACK_ASLEEP),
            Command::Blink | Command::Position { .. } => None,
        }
    }

    /// 是否为高频位置命令
    pub fn is_position(&self) -> bool {
        matches!(self, Command::Position { .. })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Wake => f.write_str("WAKE"),
            Command::Sleep => f.write_str("SLEEP"),
            Command::Blink => f.write_str("BLINK"),
            Command::Position { x, y } => write!(f, "{x},{y}"),
        }
    }
}

impl FromStr for Command {
    type Err = ProtocolError;

    /// 解析一行命令文本（忽略首尾空白和关键字大小写）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        if line.is_empty() {
            return Err(ProtocolError::Empty);
        }

        if let Some((x, y)) = line.split_once(',') {
            let x = parse_angle("x", x)?;
            let y = parse_angle("y", y)?;
            return Ok(Command::Position { x, y });
        }

        match line.to_ascii_uppercase().as_str() {
            "WAKE" => Ok(Command::Wake),
            "SLEEP" => Ok(Command::Sleep),
            "BLINK" => Ok(Command::Blink),
            _ => Err(ProtocolError::UnknownCommand(line.to_string())),
        }
    }
}

fn parse_angle(field: &'static str, value: &str) -> Result<i32, ProtocolError> {
    let angle = value
        .trim()
        .parse::<i32>()
        .map_err(|_| ProtocolError::InvalidPosition {
            field,
            value: value.to_string(),
        })?;
    if !(0..=MAX_ANGLE).contains(&angle) {
        return Err(ProtocolError::AngleOutOfRange {
            field,
            value: angle,
            max: MAX_ANGLE,
        });
    }
    Ok(angle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_keywords() {
        assert_eq!(Command::Wake.encode(), "WAKE\n");
        assert_eq!(Command::Sleep.encode(), "SLEEP\n");
        assert_eq!(Command::Blink.encode(), "BLINK\n");
    }

    #[test]
    fn test_encode_position() {
        let cmd = Command::Position { x: 10, y: 170 };
        assert_eq!(cmd.to_string(), "10,170");
        assert_eq!(cmd.encode(), "10,170\n");
        assert!(cmd.is_position());
        assert!(!Command::Blink.is_position());
    }

    #[test]
    fn test_expected_ack() {
        assert_eq!(Command::Wake.expected_ack(), Some("AWAKE"));
        assert_eq!(Command::Sleep.expected_ack(), Some("ASLEEP"));
        assert_eq!(Command::Blink.expected_ack(), None);
        assert_eq!(Command::Position { x: 1, y: 2 }.expected_ack(), None);
    }

    #[test]
    fn test_parse_is_case_insensitive_and_trims() {
        assert_eq!(" blink \r".parse::<Command>().unwrap(), Command::Blink);
        assert_eq!("Sleep".parse::<Command>().unwrap(), Command::Sleep);
        assert_eq!(
            " 90 , 45 ".parse::<Command>().unwrap(),
            Command::Position { x: 90, y: 45 }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Command>(), Err(ProtocolError::Empty));
        assert!(matches!(
            "OPEN".parse::<Command>(),
            Err(ProtocolError::UnknownCommand(_))
        ));
        assert!(matches!(
            "12,abc".parse::<Command>(),
            Err(ProtocolError::InvalidPosition { field: "y", .. })
        ));
        assert!(matches!(
            ",5".parse::<Command>(),
            Err(ProtocolError::InvalidPosition { field: "x", .. })
        ));
    }

    #[test]
    fn test_parse_rejects_out_of_range_angles() {
        assert_eq!(
            "181,90".parse::<Command>(),
            Err(ProtocolError::AngleOutOfRange {
                field: "x",
                value: 181,
                max: 180
            })
        );
        assert!(matches!(
            "90,-1".parse::<Command>(),
            Err(ProtocolError::AngleOutOfRange { field: "y", value: -1, .. })
        ));
        assert_eq!(
            "0,180".parse::<Command>().unwrap(),
            Command::Position { x: 0, y: 180 }
        );
    }

    proptest! {
        #[test]
        fn prop_position_line_parses_back(x in 0i32..=MAX_ANGLE, y in 0i32..=MAX_ANGLE) {
            let cmd = Command::Position { x, y };
            let line = cmd.encode();
            prop_assert!(line.ends_with('\n'));
            prop_assert_eq!(line.matches('\n').count(), 1);
            prop_assert_eq!(line.parse::<Command>().unwrap(), cmd);
        }
    }
}
