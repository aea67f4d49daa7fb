use crate::models::{ChatMessage, MenuItem, Resource};
use crate::services::ai::{LlmProvider, Message};
use crate::services::quote::{extract_quote, QuoteEstimate};

const SYSTEM_PROMPT: &str = r#"You are the booking assistant for a private chef and catering business. Help prospective clients plan their event and estimate a price.

Gather, conversationally and a few questions at a time: the occasion, date, location, number of guests, service style (plated, family style, buffet, drop-off), dietary restrictions, and budget.

Pricing guidance:
- Plated dinners: $85-150 per guest
- Family style: $65-110 per guest
- Buffet or drop-off: $40-75 per guest
- Minimum booking: $500

Once you know at least the guest count and service style, give an estimate on its own line in exactly this form:
QUOTE: $<amount>
or, for a range:
QUOTE: $<low>-<high>

Keep replies warm and concise. Never confirm a booking yourself; tell the client the chef reviews every request personally."#;

#[derive(Debug, Clone)]
pub struct ChatReply {
    pub reply: String,
    pub estimate: QuoteEstimate,
}

/// One line per menu item, so the assistant only talks about dishes on offer.
pub fn menu_context(items: &[MenuItem]) -> String {
    items
        .iter()
        .filter(|item| item.is_visible())
        .map(|item| match &item.description {
            Some(description) => format!("- {} (${:.2}): {}", item.name, item.price, description),
            None => format!("- {} (${:.2})", item.name, item.price),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn estimate(
    llm: &dyn LlmProvider,
    history: &[ChatMessage],
    menu: &str,
) -> anyhow::Result<ChatReply> {
    let messages: Vec<Message> = history.iter().map(Message::from).collect();

    let system = if menu.is_empty() {
        SYSTEM_PROMPT.to_string()
    } else {
        format!("{SYSTEM_PROMPT}\n\nCurrent menu:\n{menu}")
    };

    let reply = llm.chat(&system, &messages).await?;
    let estimate = extract_quote(&reply);

    tracing::debug!(quoted = estimate.quoted, quote = ?estimate.quote, "chat reply generated");

    Ok(ChatReply { reply, estimate })
}
