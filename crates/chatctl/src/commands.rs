//! Subcommand implementations

use crate::client::ChatdClient;
use anyhow::Result;
use chat_common::{AnswerSource, ChatResponse, FallbackLogEntry, FaqEntry};
use owo_colors::OwoColorize;

fn source_tag(source: AnswerSource, color: bool) -> String {
    let tag = format!("[{}]", source);
    if !color {
        return tag;
    }
    match source {
        AnswerSource::Faq => tag.green().to_string(),
        AnswerSource::Gpt => tag.cyan().to_string(),
        AnswerSource::Fallback => tag.yellow().to_string(),
    }
}

pub fn format_answer(resp: &ChatResponse, color: bool) -> String {
    format!("{} {}", source_tag(resp.source, color), resp.response)
}

pub fn format_faqs(faqs: &[FaqEntry]) -> String {
    if faqs.is_empty() {
        return "No FAQs configured.".to_string();
    }
    faqs.iter()
        .enumerate()
        .map(|(i, faq)| format!("{:>3}. Q: {}\n     A: {}", i + 1, faq.question, faq.answer))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_logs(logs: &[FallbackLogEntry]) -> String {
    if logs.is_empty() {
        return "No fallback events recorded.".to_string();
    }
    logs.iter()
        .map(|entry| {
            format!(
                "{}  {}\n    -> {}",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                entry.message,
                entry.response
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn ask(client: &ChatdClient, message: &str, color: bool) -> Result<()> {
    let resp = client.ask(message).await?;
    println!("{}", format_answer(&resp, color));
    Ok(())
}

pub async fn health(client: &ChatdClient) -> Result<()> {
    let health = client.health().await?;
    println!("{}: {}", health.status, health.message);
    Ok(())
}

pub async fn list_faqs(client: &ChatdClient) -> Result<()> {
    let list = client.list_faqs().await?;
    println!("{}", format_faqs(&list.faqs));
    println!("\n{} FAQ(s)", list.count);
    Ok(())
}

pub async fn add_faq(client: &ChatdClient, question: &str, answer: &str) -> Result<()> {
    let resp = client.add_faq(question, answer).await?;
    println!("{}", resp.message);
    Ok(())
}

pub async fn reload_faqs(client: &ChatdClient) -> Result<()> {
    let resp = client.reload_faqs().await?;
    match resp.count {
        Some(count) => println!("{} ({} FAQs)", resp.message, count),
        None => println!("{}", resp.message),
    }
    Ok(())
}

pub async fn logs(client: &ChatdClient, limit: Option<usize>) -> Result<()> {
    let resp = client.logs(limit).await?;
    println!("{}", format_logs(&resp.logs));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_answer_plain() {
        let resp = ChatResponse::new("We open at 9am.", AnswerSource::Faq);
        assert_eq!(format_answer(&resp, false), "[faq] We open at 9am.");
    }

    #[test]
    fn test_format_answer_colored_keeps_text() {
        let resp = ChatResponse::new("Sorry.", AnswerSource::Fallback);
        let out = format_answer(&resp, true);
        assert!(out.contains("fallback"));
        assert!(out.ends_with("Sorry."));
        assert_ne!(out, "[fallback] Sorry.");
    }

    #[test]
    fn test_format_faqs() {
        assert_eq!(format_faqs(&[]), "No FAQs configured.");
        let out = format_faqs(&[FaqEntry::new("Hours?", "9 to 5")]);
        assert_eq!(out, "  1. Q: Hours?\n     A: 9 to 5");
    }

    #[test]
    fn test_format_logs() {
        assert_eq!(format_logs(&[]), "No fallback events recorded.");
        let entry = FallbackLogEntry {
            timestamp: chrono::Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
            message: "refunds?".to_string(),
            response: "Contact support.".to_string(),
        };
        assert_eq!(
            format_logs(&[entry]),
            "2024-05-01 12:30:00  refunds?\n    -> Contact support."
        );
    }
}
