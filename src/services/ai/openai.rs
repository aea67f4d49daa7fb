use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{send_json, transcript, LlmProvider, Message};

const API: &str = "chat completion API";

/// Any OpenAI-compatible `/chat/completions` endpoint (OpenAI, Groq, ...).
pub struct OpenAiProvider {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl CompletionResponse {
    fn into_reply(self) -> anyhow::Result<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow::anyhow!("missing content in chat completion response"))
    }
}

impl OpenAiProvider {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn chat(&self, system_prompt: &str, messages: &[Message]) -> anyhow::Result<String> {
        let body = CompletionRequest {
            model: &self.model,
            messages: transcript(system_prompt, messages),
            temperature: 0.7,
        };
        let request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body);

        send_json::<CompletionResponse>(request, API).await?.into_reply()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_is_first_choice() {
        let resp: CompletionResponse = serde_json::from_str(
            r#"{"id":"c1","choices":[{"index":0,"message":{"role":"assistant","content":"QUOTE: $900"}},
                {"index":1,"message":{"role":"assistant","content":"other"}}]}"#,
        )
        .unwrap();
        assert_eq!(resp.into_reply().unwrap(), "QUOTE: $900");
    }

    #[test]
    fn test_reply_without_content_is_error() {
        let empty: CompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(empty.into_reply().is_err());

        let tool_call: CompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#).unwrap();
        assert!(tool_call.into_reply().is_err());
    }
}
