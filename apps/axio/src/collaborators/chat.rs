//! OpenAI Responses API 客户端（同步）

use crate::config::ChatSection;
use anyhow::{Context, Result};
use axio_sdk::control::{ChatBackend, ChatError};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct Effort<'a> {
    effort: &'a str,
}

#[derive(Serialize)]
struct Verbosity<'a> {
    verbosity: &'a str,
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
    reasoning: Effort<'a>,
    text: Verbosity<'a>,
}

/// AI 对话客户端
pub struct OpenAiChat {
    client: reqwest::blocking::Client,
    config: ChatSection,
    api_key: Option<String>,
}

impl OpenAiChat {
    pub fn new(config: ChatSection) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_s))
            .build()
            .context("Failed to build HTTP client")?;
        let api_key = std::env::var(&config.api_key_env).ok().filter(|k| !k.is_empty());
        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl ChatBackend for OpenAiChat {
    fn ask(&mut self, prompt: &str) -> Result<String, ChatError> {
        let Some(api_key) = &self.api_key else {
            return Err(ChatError::Config(format!("{} is not set", self.config.api_key_env)));
        };

        let request = ResponsesRequest {
            model: &self.config.model,
            input: prompt,
            reasoning: Effort {
                effort: &self.config.reasoning_effort,
            },
            text: Verbosity {
                verbosity: &self.config.verbosity,
            },
        };

        debug!("POST {} ({} prompt bytes)", self.config.endpoint, prompt.len());
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        let status = response.status();
        let body: Value = response
            .json()
            .map_err(|e| ChatError::Decode(e.to_string()))?;

        if !status.is_success() {
            return Err(ChatError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        extract_reply(&body)
    }
}

fn error_message(body: &Value) -> String {
    body.pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

/// 从响应中取出回复文本
///
/// 优先使用 `output_text`，否则拼接 `output[].content[]` 中所有 `output_text` 片段。
pub fn extract_reply(body: &Value) -> Result<String, ChatError> {
    if let Some(text) = body.get("output_text").and_then(Value::as_str) {
        return Ok(text.trim().to_string());
    }

    let mut reply = String::new();
    let items = body.get("output").and_then(Value::as_array);
    for item in items.into_iter().flatten() {
        let parts = item.get("content").and_then(Value::as_array);
        for part in parts.into_iter().flatten() {
            if part.get("type").and_then(Value::as_str) == Some("output_text")
                && let Some(text) = part.get("text").and_then(Value::as_str)
            {
                reply.push_str(text);
            }
        }
    }

    if reply.trim().is_empty() {
        return Err(ChatError::Decode("response contains no output text".to_string()));
    }
    Ok(reply.trim().to_string())
}
