//! 外部协作者的具体实现

pub mod chat;
pub mod listener;
pub mod perception;
pub mod speaker;

pub use chat::OpenAiChat;
pub use listener::LineListener;
pub use perception::{SimulatedPerception, UdpPerception};
pub use speaker::{ConsoleSpeaker, EspeakSpeaker};
