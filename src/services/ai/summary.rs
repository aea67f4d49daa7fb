use crate::models::{ChatMessage, ChatRole};
use crate::services::ai::{LlmProvider, Message};

const SUMMARY_PROMPT: &str = "You summarize catering inquiries for a private chef. \
Given a chat transcript between a prospective client and the booking assistant, write \
3-5 short sentences covering: the occasion, guest count, dietary needs or preferences, \
menu ideas discussed, budget or quoted price, and any open questions. Plain text only.";

const NO_HISTORY: &str = "No chat history provided.";

/// Longest excerpt of a single message kept in the local summary.
const EXCERPT_CHARS: usize = 200;

/// Summarizes a transcript with the LLM, falling back to a local digest when
/// the call fails or returns nothing.
pub async fn summarize_chat(llm: &dyn LlmProvider, history: &[ChatMessage]) -> String {
    if history.is_empty() {
        return NO_HISTORY.to_string();
    }

    let transcript = history
        .iter()
        .map(|m| format!("{}: {}", speaker(m.role), m.content.trim()))
        .collect::<Vec<_>>()
        .join("\n");
    let request = [Message {
        role: "user".to_string(),
        content: format!("Summarize this conversation:\n\n{transcript}"),
    }];

    match llm.chat(SUMMARY_PROMPT, &request).await {
        Ok(summary) if !summary.trim().is_empty() => summary.trim().to_string(),
        Ok(_) => {
            tracing::warn!("LLM returned an empty chat summary, using local summary");
            local_summary(history)
        }
        Err(e) => {
            tracing::warn!(error = %e, "chat summarization failed, using local summary");
            local_summary(history)
        }
    }
}

fn speaker(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "Client",
        ChatRole::Assistant => "Assistant",
    }
}

fn excerpt(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= EXCERPT_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", cut.trim_end())
}

pub fn local_summary(history: &[ChatMessage]) -> String {
    if history.is_empty() {
        return NO_HISTORY.to_string();
    }

    let client_messages: Vec<&ChatMessage> =
        history.iter().filter(|m| m.role == ChatRole::User).collect();

    let mut summary = format!(
        "Chat of {} messages ({} from the client).",
        history.len(),
        client_messages.len()
    );
    if let Some(first) = client_messages.first() {
        summary.push_str(&format!(" Client opened with: \"{}\"", excerpt(&first.content)));
    }
    if client_messages.len() > 1 {
        if let Some(last) = client_messages.last() {
            summary.push_str(&format!(" Last client message: \"{}\"", excerpt(&last.content)));
        }
    }
    if let Some(reply) = history.iter().rev().find(|m| m.role == ChatRole::Assistant) {
        summary.push_str(&format!(" Last assistant reply: \"{}\"", excerpt(&reply.content)));
    }
    summary
}
