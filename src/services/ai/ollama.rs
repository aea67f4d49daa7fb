use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{send_json, transcript, LlmProvider, Message};

/// Local Ollama server, used in development when no hosted key is configured.
pub struct OllamaProvider {
    url: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct OllamaChat<'a> {
    model: &'a str,
    messages: Vec<Message>,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaReply {
    message: Message,
}

impl OllamaProvider {
    pub fn new(url: String, model: String) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            model,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn chat(&self, system_prompt: &str, messages: &[Message]) -> anyhow::Result<String> {
        let body = OllamaChat {
            model: &self.model,
            messages: transcript(system_prompt, messages),
            stream: false,
        };
        let request = self.client.post(format!("{}/api/chat", self.url)).json(&body);

        let reply: OllamaReply = send_json(request, "Ollama API").await?;
        Ok(reply.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_disables_streaming() {
        let body = OllamaChat {
            model: "llama3.2",
            messages: transcript("be brief", &[]),
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "system");
    }

    #[test]
    fn test_reply_parsing() {
        let reply: OllamaReply = serde_json::from_str(
            r#"{"model":"llama3.2","message":{"role":"assistant","content":"Sounds lovely"},"done":true}"#,
        )
        .unwrap();
        assert_eq!(reply.message.content, "Sounds lovely");
    }
}
