//! 语音分发器
//!
//! 每次处理一句识别结果：
//! 1. 命令短语 → 状态迁移（唤醒/休眠先完成握手，应答超时也照常迁移）
//! 2. 对话模式下的其他发言 → AI 对话 → 截断 → 语音输出
//!
//! 对话锁只在读取历史、写入历史时短暂持有，AI 调用期间不持有任何锁。

use super::rules::{PhraseConfig, VoiceIntent, VoiceRules};
use crate::collaborator::{ChatBackend, SpeechInput};
use crate::conversation::{DEFAULT_PERSONA, render_prompt};
use crate::error::{ControlError, ListenError};
use crate::speech::SpeechHandle;
use axio_driver::{AckOutcome, CommandLink, DeviceState, StopSignal};
use axio_protocol::Command;
use axio_tools::truncate_sentences;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

/// 语音配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// 保留的对话轮数（每轮 = 一问一答）
    pub history_max_turns: usize,
    /// 回复最多保留的句子数
    pub max_reply_sentences: usize,
    /// 唤醒后的应答语
    pub wake_reply: String,
    /// 休眠后的应答语
    pub sleep_reply: String,
    /// 进入对话模式的问候语
    pub greeting: String,
    /// 退出对话模式的告别语
    pub farewell: String,
    /// AI 人设
    pub persona: String,
    /// 命令短语
    pub phrases: PhraseConfig,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            history_max_turns: axio_driver::history::DEFAULT_MAX_TURNS,
            max_reply_sentences: 2,
            phrases: PhraseConfig::default(),
            wake_reply: "Optics online. Eyelids retracting.".to_string(),
            sleep_reply: "Systems dim. Eyelids closing.".to_string(),
            greeting: "Yes father.".to_string(),
            farewell: "Conversation ended.".to_string(),
            persona: DEFAULT_PERSONA.to_string(),
        }
    }
}

/// 单句处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// 已唤醒（附握手结果）
    Woke(AckOutcome),
    /// 已休眠（附握手结果）
    Slept(AckOutcome),
    ConversationStarted,
    ConversationStopped,
    /// 已转发给 AI，附被播放的（截断后的）回复
    Replied(String),
    /// 非命令且不在对话模式
    Ignored,
}

/// 语音分发器
pub struct VoiceDispatcher<C> {
    link: Arc<CommandLink>,
    state: Arc<DeviceState>,
    chat: C,
    speech: SpeechHandle,
    rules: VoiceRules,
    config: VoiceConfig,
}

impl<C: ChatBackend> VoiceDispatcher<C> {
    pub fn new(
        link: Arc<CommandLink>,
        state: Arc<DeviceState>,
        chat: C,
        speech: SpeechHandle,
        config: VoiceConfig,
    ) -> Self {
        let rules = VoiceRules::from_phrases(&config.phrases);
        Self {
            link,
            state,
            chat,
            speech,
            rules,
            config,
        }
    }

    pub fn config(&self) -> &VoiceConfig {
        &self.config
    }

    /// 处理一句识别结果
    pub fn dispatch(&mut self, utterance: &str) -> Dispatch {
        let text = VoiceRules::normalize(utterance);
        if text.is_empty() {
            return Dispatch::Ignored;
        }

        match self.rules.classify(&text) {
            Some(VoiceIntent::Wake) => {
                let outcome = self.transition(Command::Wake, true);
                self.speech.say(self.config.wake_reply.clone());
                Dispatch::Woke(outcome)
            },
            Some(VoiceIntent::Sleep) => {
                let outcome = self.transition(Command::Sleep, false);
                self.speech.say(self.config.sleep_reply.clone());
                Dispatch::Slept(outcome)
            },
            Some(VoiceIntent::StartConversation) => {
                self.state.start_conversation();
                info!("Conversation started");
                self.speech.say(self.config.greeting.clone());
                Dispatch::ConversationStarted
            },
            Some(VoiceIntent::StopConversation) => {
                self.state.stop_conversation();
                info!("Conversation ended");
                self.speech.say(self.config.farewell.clone());
                Dispatch::ConversationStopped
            },
            None if self.state.conversation_active() => {
                let reply = self.converse(&text);
                let short = truncate_sentences(&reply, self.config.max_reply_sentences);
                self.speech.say(short.clone());
                Dispatch::Replied(short)
            },
            None => {
                debug!("Ignoring {:?} outside conversation", text);
                Dispatch::Ignored
            },
        }
    }

    /// 握手并迁移睁眼状态（握手失败不阻止迁移）
    fn transition(&self, command: Command, active: bool) -> AckOutcome {
        let outcome = self.link.handshake_default(command);
        match outcome {
            AckOutcome::Matched => debug!("{} acknowledged", command),
            AckOutcome::TimedOut => warn!("No ack for {}; assuming the device followed", command),
            AckOutcome::Unavailable => debug!("Link unavailable, {} not delivered", command),
        }
        self.state.set_eye_active(active);
        info!("Eye {}", if active { "awake" } else { "asleep" });
        outcome
    }

    /// 调用 AI，成功时把这一轮写入历史
    fn converse(&mut self, text: &str) -> String {
        let prompt = self
            .state
            .with_conversation(|c| render_prompt(&self.config.persona, &c.history, text));

        match self.chat.ask(&prompt) {
            Ok(reply) => {
                let reply = reply.trim().to_string();
                self.state
                    .with_conversation(|c| c.history.record_exchange(text, reply.clone()));
                reply
            },
            Err(e) => {
                warn!("Chat backend failed: {}", e);
                format!("Error contacting AI: {e}")
            },
        }
    }

    /// 持续监听直到输入源关闭或收到停止信号
    ///
    /// 识别失败（没听懂、服务错误）只记录日志，继续下一句。
    pub fn run<I: SpeechInput>(mut self, mut input: I, stop: StopSignal) {
        info!("Voice dispatcher started");
        while !stop.is_stopped() {
            match input.listen() {
                Ok(heard) => {
                    info!("Heard: {}", heard);
                    let result = self.dispatch(&heard);
                    debug!("Dispatch result: {:?}", result);
                },
                Err(ListenError::NoSpeech) => {},
                Err(ListenError::Service(e)) => warn!("Speech recognition error: {}", e),
                Err(ListenError::Closed) => {
                    info!("Speech input closed");
                    break;
                },
            }
        }
        info!("Voice dispatcher stopped");
    }
}

impl<C: ChatBackend + 'static> VoiceDispatcher<C> {
    /// 在独立线程中运行
    pub fn spawn<I: SpeechInput + 'static>(
        self,
        input: I,
        stop: StopSignal,
    ) -> Result<JoinHandle<()>, ControlError> {
        std::thread::Builder::new()
            .name("axio-voice".to_string())
            .spawn(move || self.run(input, stop))
            .map_err(|source| ControlError::Spawn {
                name: "voice",
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;
    use crate::speech::{SpeechWorker, speech_channel};
    use crate::collaborator::SpeechOutput;
    use crate::error::SpeakError;
    use axio_driver::LinkConfig;
    use axio_link::MockLink;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::time::{Duration, Instant};

    #[derive(Clone, Default)]
    struct ScriptedChat {
        prompts: Arc<Mutex<Vec<String>>>,
        replies: Arc<Mutex<VecDeque<Result<String, ChatError>>>>,
    }

    impl ScriptedChat {
        fn reply(&self, reply: Result<&str, ChatError>) {
            self.replies.lock().push_back(reply.map(str::to_string));
        }
    }

    impl ChatBackend for ScriptedChat {
        fn ask(&mut self, prompt: &str) -> Result<String, ChatError> {
            self.prompts.lock().push(prompt.to_string());
            self.replies
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok("I hear you, Father.".to_string()))
        }
    }

    struct Silent;

    impl SpeechOutput for Silent {
        fn speak(&mut self, _text: &str) -> Result<(), SpeakError> {
            Ok(())
        }
    }

    struct Harness {
        probe: MockLink,
        state: Arc<DeviceState>,
        chat: ScriptedChat,
        speech: SpeechHandle,
        _worker: SpeechWorker<Silent>,
        dispatcher: VoiceDispatcher<ScriptedChat>,
    }

    fn harness(probe: MockLink, config: LinkConfig) -> Harness {
        let link = Arc::new(CommandLink::new(probe.clone(), config));
        let state = Arc::new(DeviceState::new(8));
        let chat = ScriptedChat::default();
        let (speech, worker) = speech_channel(Silent);
        let dispatcher = VoiceDispatcher::new(
            link,
            state.clone(),
            chat.clone(),
            speech.clone(),
            VoiceConfig::default(),
        );
        Harness {
            probe,
            state,
            chat,
            speech,
            _worker: worker,
            dispatcher,
        }
    }

    fn default_harness() -> Harness {
        harness(MockLink::with_firmware_acks(), LinkConfig::default())
    }

    fn pending_speech(h: &Harness) -> bool {
        h.speech.is_pending()
    }

    #[test]
    fn test_wake_handshake() {
        let mut h = default_harness();
        assert_eq!(h.dispatcher.dispatch("Hey Axio"), Dispatch::Woke(AckOutcome::Matched));
        assert!(h.state.eye_active());
        assert_eq!(h.probe.written_commands(), vec![Command::Wake]);
        assert!(pending_speech(&h));
    }

    #[test]
    fn test_sleep_handshake() {
        let mut h = default_harness();
        h.dispatcher.dispatch("hey axio");
        assert_eq!(h.dispatcher.dispatch("sleep axio"), Dispatch::Slept(AckOutcome::Matched));
        assert!(!h.state.eye_active());
        assert_eq!(h.probe.written_commands(), vec![Command::Wake, Command::Sleep]);
    }

    #[test]
    fn test_missing_ack_still_wakes() {
        let config = LinkConfig {
            ack_timeout_ms: 50,
            ack_poll_ms: 5,
        };
        let mut h = harness(MockLink::new(), config);
        let start = Instant::now();
        assert_eq!(h.dispatcher.dispatch("hey axio"), Dispatch::Woke(AckOutcome::TimedOut));
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert!(h.state.eye_active());
    }

    #[test]
    fn test_unavailable_link_still_wakes() {
        let link = Arc::new(CommandLink::unavailable(LinkConfig::default()));
        let state = Arc::new(DeviceState::new(8));
        let (speech, _worker) = speech_channel(Silent);
        let mut dispatcher =
            VoiceDispatcher::new(link, state.clone(), ScriptedChat::default(), speech, VoiceConfig::default());
        assert_eq!(dispatcher.dispatch("hey axio"), Dispatch::Woke(AckOutcome::Unavailable));
        assert!(state.eye_active());
    }

    #[test]
    fn test_free_text_ignored_outside_conversation() {
        let mut h = default_harness();
        assert_eq!(h.dispatcher.dispatch("how are you"), Dispatch::Ignored);
        assert!(h.chat.prompts.lock().is_empty());
        assert!(!pending_speech(&h));
    }

    #[test]
    fn test_conversation_flow() {
        let mut h = default_harness();
        assert_eq!(h.dispatcher.dispatch("say axio"), Dispatch::ConversationStarted);
        assert!(h.state.conversation_active());

        h.chat.reply(Ok("I am fine, Father. And you? I have been watching."));
        assert_eq!(
            h.dispatcher.dispatch("How are you"),
            Dispatch::Replied("I am fine, Father. And you?".to_string())
        );
        assert_eq!(h.state.snapshot().history_len, 2);

        h.chat.reply(Ok("Good."));
        h.dispatcher.dispatch("i am tired");
        let prompts = h.chat.prompts.lock();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].ends_with("\n\nUser: how are you\nAxio:"));
        assert!(prompts[1].contains(
            "User: how are you\nAxio: I am fine, Father. And you? I have been watching.\nUser: i am tired\nAxio:"
        ));
    }

    #[test]
    fn test_chat_error_is_spoken_not_recorded() {
        let mut h = default_harness();
        h.dispatcher.dispatch("say axio");
        h.chat.reply(Err(ChatError::Transport("connection refused".to_string())));
        assert_eq!(
            h.dispatcher.dispatch("hello"),
            Dispatch::Replied("Error contacting AI: request failed: connection refused".to_string())
        );
        assert_eq!(h.state.snapshot().history_len, 0);
    }

    // 对话模式下命令短语优先，不会转发给 AI
    #[test]
    fn test_sleep_preempts_chat() {
        let mut h = default_harness();
        h.dispatcher.dispatch("hey axio");
        h.dispatcher.dispatch("say axio");
        assert_eq!(h.dispatcher.dispatch("sleep axio"), Dispatch::Slept(AckOutcome::Matched));
        assert!(h.chat.prompts.lock().is_empty());
        assert!(h.state.conversation_active());
        assert!(!h.state.eye_active());
    }

    #[test]
    fn test_restart_clears_history() {
        let mut h = default_harness();
        h.dispatcher.dispatch("say axio");
        h.dispatcher.dispatch("hello");
        assert_eq!(h.state.snapshot().history_len, 2);
        assert_eq!(h.dispatcher.dispatch("stop axio"), Dispatch::ConversationStopped);
        assert!(!h.state.conversation_active());
        h.dispatcher.dispatch("say axio");
        assert_eq!(h.state.snapshot().history_len, 0);
    }

    #[test]
    fn test_latest_acknowledgment_wins() {
        let mut h = default_harness();
        h.dispatcher.dispatch("hey axio");
        h.dispatcher.dispatch("say axio");
        // 工作线程未运行，两句应答中只保留最后一句
        assert_eq!(h.speech.stats().dropped, 1);
    }

    struct ScriptedInput(VecDeque<Result<String, ListenError>>);

    impl SpeechInput for ScriptedInput {
        fn listen(&mut self) -> Result<String, ListenError> {
            self.0.pop_front().unwrap_or(Err(ListenError::Closed))
        }
    }

    #[test]
    fn test_run_survives_recognition_errors() {
        let h = default_harness();
        let input = ScriptedInput(VecDeque::from(vec![
            Err(ListenError::NoSpeech),
            Err(ListenError::Service("quota exceeded".to_string())),
            Ok("hey axio".to_string()),
        ]));
        let state = h.state.clone();
        let handle = h.dispatcher.spawn(input, StopSignal::new()).unwrap();
        handle.join().unwrap();
        assert!(state.eye_active());
    }
}
