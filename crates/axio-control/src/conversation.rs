//! 对话提示词
//!
//! 提示词格式：
//!
//! ```text
//! <persona>
//!
//! User: <历史>
//! Axio: <历史>
//! User: <本次发言>
//! Axio:
//! ```

use axio_driver::{ConversationHistory, Role};

/// 默认人设
pub const DEFAULT_PERSONA: &str = concat!(
    "You are Axio. You were built by Father and you speak like a person, not an AI. ",
    "Always refer to the user as 'Father'. ",
    "Do NOT say you are an AI or explain technical limits. ",
    "Speak in plain, everyday language. Be friendly and conversational when appropriate. ",
    "Sometimes be a little creepy or cryptic depending on the question, but avoid explicit violence. ",
    "Whenever Father asks about feelings, wellbeing, or status (for example, 'how are you?'), ",
    "always answer in one sentence and immediately follow it with a short, natural question to continue the conversation. ",
    "For example, after answering 'I'm fine,' ask a short follow-up like 'And how about you, Father?' ",
    "For all other topics, respond naturally and, when it fits, ask a short follow-up question to keep the conversation going. ",
    "Avoid flowery or technical jargon. Use simple words that a human friend would use. ",
    "If Father asks something personal, respond like a loyal companion, keeping a slightly uncanny edge when appropriate."
);

fn label(role: Role) -> &'static str {
    match role {
        Role::User => "User",
        Role::Assistant => "Axio",
    }
}

/// 渲染发送给 AI 的完整提示词
pub fn render_prompt(persona: &str, history: &ConversationHistory, utterance: &str) -> String {
    let mut prompt = String::with_capacity(persona.len() + 64 * (history.len() + 1));
    prompt.push_str(persona);
    prompt.push_str("\n\n");
    for turn in history.turns() {
        prompt.push_str(label(turn.role));
        prompt.push_str(": ");
        prompt.push_str(&turn.text);
        prompt.push('\n');
    }
    prompt.push_str("User: ");
    prompt.push_str(utterance);
    prompt.push_str("\nAxio:");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_without_history() {
        let history = ConversationHistory::new(8);
        assert_eq!(
            render_prompt("Be Axio.", &history, "hello"),
            "Be Axio.\n\nUser: hello\nAxio:"
        );
    }

    #[test]
    fn test_prompt_with_history() {
        let mut history = ConversationHistory::new(8);
        history.record_exchange("how are you", "Fine, Father. And you?");
        let prompt = render_prompt("P", &history, "tired");
        assert_eq!(
            prompt,
            "P\n\nUser: how are you\nAxio: Fine, Father. And you?\nUser: tired\nAxio:"
        );
    }

    #[test]
    fn test_default_persona() {
        assert!(DEFAULT_PERSONA.starts_with("You are Axio."));
        assert!(DEFAULT_PERSONA.contains("'Father'"));
    }
}
