pub mod estimator;
pub mod ollama;
pub mod openai;
pub mod summary;

use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }
}

/// A hosted chat-completion model: system prompt plus role-tagged history in,
/// one assistant reply out.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn chat(&self, system_prompt: &str, messages: &[Message]) -> anyhow::Result<String>;
}

/// The conversation as both chat APIs take it, system prompt first.
fn transcript(system_prompt: &str, messages: &[Message]) -> Vec<Message> {
    std::iter::once(Message::system(system_prompt))
        .chain(messages.iter().cloned())
        .collect()
}

/// Sends a JSON request and decodes the reply. Non-2xx responses become errors
/// carrying the response body.
async fn send_json<T: DeserializeOwned>(request: reqwest::RequestBuilder, api: &str) -> anyhow::Result<T> {
    let resp = request
        .send()
        .await
        .with_context(|| format!("failed to call {api}"))?;

    let status = resp.status();
    let body = resp
        .text()
        .await
        .with_context(|| format!("failed to read {api} response"))?;
    if !status.is_success() {
        anyhow::bail!("{api} error ({status}): {body}");
    }

    serde_json::from_str(&body).with_context(|| format!("failed to parse {api} response"))
}
