//! 外部协作者接口
//!
//! 摄像头与检测器、语音识别、AI 对话、语音合成都是不透明的外部组件，
//! 控制层只通过这几个窄接口调用它们。每个调用都返回显式的结果值，
//! 由调用方决定如何降级。

use crate::error::{ChatError, ListenError, PerceptionError, SpeakError};
use crate::target::Observation;

/// 感知协作者
pub trait Perception: Send {
    /// 阻塞获取下一帧的检测结果
    ///
    /// - `Ok(Some(_))`：一帧（可能没有任何检测）
    /// - `Ok(None)`：本周期没有帧（摄像头暂时读不到）
    /// - `Err(PerceptionError::Closed)`：感知源结束，跟踪循环退出
    fn next_observation(&mut self) -> Result<Option<Observation>, PerceptionError>;
}

/// 语音识别协作者
pub trait SpeechInput: Send {
    /// 阻塞直到听到一句话，返回转写文本
    fn listen(&mut self) -> Result<String, ListenError>;
}

/// AI 对话协作者
pub trait ChatBackend: Send {
    /// 发送带历史的完整提示词，返回回复文本
    fn ask(&mut self, prompt: &str) -> Result<String, ChatError>;
}

/// 语音合成协作者
pub trait SpeechOutput: Send {
    /// 阻塞直到这句话播放完毕
    fn speak(&mut self, text: &str) -> Result<(), SpeakError>;
}

impl<T: Perception + ?Sized> Perception for Box<T> {
    fn next_observation(&mut self) -> Result<Option<Observation>, PerceptionError> {
        (**self).next_observation()
    }
}

impl<T: SpeechInput + ?Sized> SpeechInput for Box<T> {
    fn listen(&mut self) -> Result<String, ListenError> {
        (**self).listen()
    }
}

impl<T: ChatBackend + ?Sized> ChatBackend for Box<T> {
    fn ask(&mut self, prompt: &str) -> Result<String, ChatError> {
        (**self).ask(prompt)
    }
}

impl<T: SpeechOutput + ?Sized> SpeechOutput for Box<T> {
    fn speak(&mut self, text: &str) -> Result<(), SpeakError> {
        (**self).speak(text)
    }
}
