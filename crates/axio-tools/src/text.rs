//! 回复截断
//!
//! AI 回复可能很长，而语音输出应该简短。这里按句末标点切分并保留前 N 句。

/// 句末标点
const TERMINATORS: [char; 3] = ['.', '!', '?'];

/// 保留最多 `max_sentences` 个非空句子
///
/// 规则：
/// - 按 `.`、`!`、`?` 切分，每个句子保留其结尾标点，以单个空格连接
/// - 只由标点组成的"空句子"被跳过，不计数
/// - 最后一个标点之后的残余文本被丢弃
/// - 文本中没有任何句末标点时，返回去除首尾空白后的原文
/// - 结果为空时（例如 `max_sentences == 0`），同样返回去除首尾空白后的原文
///
/// # Example
///
/// ```
/// use axio_tools::truncate_sentences;
///
/// let reply = "I am fine. How are you, Father? I have been watching.";
/// assert_eq!(truncate_sentences(reply, 2), "I am fine. How are you, Father?");
/// ```
pub fn truncate_sentences(text: &str, max_sentences: usize) -> String {
    if !text.contains(TERMINATORS) {
        return text.trim().to_string();
    }

    let mut out: Vec<String> = Vec::new();
    let mut start = 0;
    for (idx, punct) in text.match_indices(TERMINATORS) {
        if out.len() >= max_sentences {
            break;
        }
        let sentence = text[start..idx].trim();
        if !sentence.is_empty() {
            out.push(format!("{sentence}{punct}"));
        }
        start = idx + punct.len();
    }

    let result = out.join(" ");
    if result.is_empty() {
        text.trim().to_string()
    } else {
        result
    }
}
