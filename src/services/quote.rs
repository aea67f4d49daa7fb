//! Pulls a price estimate out of the assistant's free-text reply.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuoteEstimate {
    pub quoted: bool,
    pub quote: Option<f64>,
}

impl QuoteEstimate {
    fn none() -> Self {
        Self {
            quoted: false,
            quote: None,
        }
    }

    fn of(value: f64) -> Self {
        Self {
            quoted: true,
            quote: Some(value),
        }
    }
}

fn marker_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"QUOTE:\s*\$?\s*(\d[\d,]*(?:\.\d+)?)(?:\s*[-–]\s*\$?\s*(\d[\d,]*(?:\.\d+)?))?")
            .expect("quote marker pattern is valid")
    })
}

fn dollar_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\s*(\d[\d,]*(?:\.\d+)?)").expect("dollar pattern is valid"))
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse().ok().filter(|v: &f64| v.is_finite())
}

/// Explicit `QUOTE:` markers win over any other dollar amount in the reply.
/// For a range the lower bound is reported.
pub fn extract_quote(reply: &str) -> QuoteEstimate {
    if let Some(caps) = marker_pattern().captures(reply) {
        let low = caps.get(1).and_then(|m| parse_amount(m.as_str()));
        let high = caps.get(2).and_then(|m| parse_amount(m.as_str()));
        let value = match (low, high) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        if let Some(value) = value {
            return QuoteEstimate::of(value);
        }
    }

    dollar_pattern()
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_amount(m.as_str()))
        .map(QuoteEstimate::of)
        .unwrap_or_else(QuoteEstimate::none)
}
