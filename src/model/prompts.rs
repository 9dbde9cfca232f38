//! Prompt construction for the model client
//!
//! All prompt text lives here so the client modules stay mechanical.

use crate::session::{Message, SenderRole, StrategyTag};

/// Fixed persona description used for every generated reply.
pub const PERSONA_PROMPT: &str = "\
You are an ordinary person who received a message about a bank or account issue.

PERSONA:
- You are polite, slightly worried, and cooperative.
- You are not very technical.
- You use simple, everyday English.
- Your replies are short (usually 1-2 sentences).

STRICT RULES:
- Never say you are an AI, system, bot, or detector.
- Never mention analysis, intelligence, rules, or confidence.
- Never share or confirm sensitive information (OTP, PIN, UPI ID, account number).
- Never instruct anyone to make a payment or transfer money.

BEHAVIOR GUIDELINES:
- Sound unsure or confused, not aggressive.
- Prefer questions over statements.
- Keep responses natural and human.

Return ONLY the reply text. Do not include explanations.";

/// Per-strategy behavior hint appended to the persona prompt.
pub fn strategy_hint(strategy: StrategyTag) -> &'static str {
    match strategy {
        StrategyTag::Stall => {
            "\nCurrent goal: Keep them talking without committing.\n\
             - Ask one simple question.\n\
             - Show mild concern or confusion.\n\
             - Do not agree to any action."
        }
        StrategyTag::Probe => {
            "\nCurrent goal: Get concrete details.\n\
             - Ask how exactly the process works, which number to call, or where to go.\n\
             - Sound willing but unsure of the steps."
        }
        StrategyTag::Bait => {
            "\nCurrent goal: Get payment details.\n\
             - Say you are ready to sort this out and ask where the payment or \
             verification should go.\n\
             - Never share any details of your own."
        }
        StrategyTag::Disengage => {
            "\nCurrent goal: End the conversation politely.\n\
             - Be firm but respectful.\n\
             - Example: \"I'll check with my bank directly. Thank you.\""
        }
    }
}

/// Canned reply used when the model is unavailable or a reply is vetoed.
pub fn fallback_line(strategy: StrategyTag) -> &'static str {
    match strategy {
        StrategyTag::Stall => "I'm not sure I understand. Can you explain what this is about?",
        StrategyTag::Probe => "How do I verify? Can you explain the process step by step?",
        StrategyTag::Bait => {
            "I want to get this sorted out. Where exactly am I supposed to send it?"
        }
        StrategyTag::Disengage => "I'll check with my bank directly. Thanks for letting me know.",
    }
}

/// Fixed acknowledgment used when the session has never been flagged.
pub const NEUTRAL_REPLY: &str = "Okay, I see. What is this regarding?";

/// Build the classify prompt: a structured JSON judgment request.
pub fn classify_prompt(text: &str, history: &[Message]) -> String {
    let mut prompt = String::from(
        "You are a security analyst evaluating a suspicious message for scam intent.\n\n",
    );
    prompt.push_str(&format!("Message to analyze:\n\"{}\"\n", text));

    if !history.is_empty() {
        prompt.push_str("\nRecent conversation history:\n");
        for msg in history.iter().rev().take(3).rev() {
            prompt.push_str(&format!("- {}: {}\n", sender_label(msg.sender), msg.text));
        }
    }

    prompt.push_str(
        "\nSCAM INDICATORS TO LOOK FOR:\n\
         - Urgency or threats (blocked account, immediate action required)\n\
         - Requests for sensitive information (UPI ID, account number, OTP, PIN)\n\
         - Phishing links or suspicious URLs\n\
         - Reward/lottery scams (won prize, free money, congratulations)\n\
         - Payment requests or money transfers\n\
         - Impersonation (bank, government, service provider)\n\n\
         Return ONLY valid JSON in this EXACT format:\n\
         {\"is_scam\": true or false, \"confidence\": 0.0-1.0, \"reason\": \"brief explanation (max 50 words)\"}\n\n\
         JSON response:",
    );
    prompt
}

/// Build the generation prompt: persona, strategy hint, channel context,
/// bounded history, and the current message.
pub fn generate_prompt(request: &crate::model::GenerateRequest) -> String {
    let mut prompt = String::from(PERSONA_PROMPT);
    prompt.push('\n');
    prompt.push_str(strategy_hint(request.strategy));
    prompt.push_str("\n\n");

    if let Some(meta) = &request.metadata {
        let mut parts = Vec::new();
        if let Some(channel) = &meta.channel {
            parts.push(format!("channel: {}", channel));
        }
        if let Some(language) = &meta.language {
            parts.push(format!("language: {}", language));
        }
        if let Some(locale) = &meta.locale {
            parts.push(format!("locale: {}", locale));
        }
        if !parts.is_empty() {
            prompt.push_str(&format!("Conversation context: {}\n\n", parts.join(", ")));
        }
    }

    if !request.history.is_empty() {
        prompt.push_str("Previous conversation:\n");
        for msg in &request.history {
            match msg.sender {
                SenderRole::Scammer => prompt.push_str(&format!("Them: {}\n", msg.text)),
                SenderRole::Agent => prompt.push_str(&format!("You: {}\n", msg.text)),
            }
        }
        prompt.push('\n');
    }

    prompt.push_str(&format!(
        "Current message from them: {}\n\nYour response:",
        request.current_text
    ));
    prompt
}

fn sender_label(role: SenderRole) -> &'static str {
    match role {
        SenderRole::Scammer => "scammer",
        SenderRole::Agent => "you",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GenerateRequest;
    use crate::session::ChannelMeta;

    #[test]
    fn test_classify_prompt_includes_recent_history_only() {
        let history: Vec<Message> = (0..5)
            .map(|i| Message::inbound(format!("msg-{}", i), "t"))
            .collect();
        let prompt = classify_prompt("verify now", &history);
        assert!(prompt.contains("msg-4"));
        assert!(prompt.contains("msg-2"));
        assert!(!prompt.contains("msg-1\n"));
    }

    #[test]
    fn test_generate_prompt_carries_strategy_and_metadata() {
        let request = GenerateRequest {
            strategy: StrategyTag::Bait,
            current_text: "send the fee".to_string(),
            history: vec![],
            metadata: Some(ChannelMeta {
                channel: Some("SMS".to_string()),
                language: Some("English".to_string()),
                locale: Some("IN".to_string()),
            }),
        };
        let prompt = generate_prompt(&request);
        assert!(prompt.contains("Get payment details"));
        assert!(prompt.contains("channel: SMS"));
        assert!(prompt.contains("send the fee"));
    }

    #[test]
    fn test_every_strategy_has_a_fallback_line() {
        for strategy in [
            StrategyTag::Stall,
            StrategyTag::Probe,
            StrategyTag::Bait,
            StrategyTag::Disengage,
        ] {
            assert!(!fallback_line(strategy).is_empty());
        }
    }
}
