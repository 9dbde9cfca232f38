//! Rule-based scam scoring
//!
//! Deterministic fallback path for the detector: a weighted sum over
//! indicator families. Each family contributes a fixed weight when any of
//! its keyword/regex set matches; the total is clamped to [0, 1].

use crate::error::{Error, Result};
use crate::session::Message;
use regex::Regex;

/// Keywords with high scam specificity.
const SCAM_KEYWORDS: &[&str] = &[
    "verify immediately",
    "account blocked",
    "suspended",
    "click here",
    "verify now",
    "urgent action required",
    "your account",
    "will be blocked",
    "avoid suspension",
    "share your",
    "send otp",
    "verify your identity",
    "winning prize",
    "congratulations",
    "claim now",
    "free money",
    "lottery winner",
    "inheritance",
    "tax refund",
    "government benefit",
];

/// Reward / lottery scam keywords.
const REWARD_KEYWORDS: &[&str] = &[
    "won a prize",
    "won cash",
    "cash prize",
    "you have won",
    "you won",
    "lottery",
    "congratulations",
    "claim your prize",
    "free money",
    "cash reward",
    "reward amount",
];

/// Quick indicator check used for the history echo.
const QUICK_CHECK_KEYWORDS: &[&str] = &["verify", "blocked", "urgent", "suspended", "upi"];

/// Outcome of one rule-scoring pass.
#[derive(Debug, Clone)]
pub struct RuleScore {
    /// Weighted sum clamped to [0, 1]
    pub score: f64,
    /// Which indicator families matched
    pub evidence: Vec<String>,
}

/// Weighted indicator-family scorer.
#[derive(Debug)]
pub struct RuleScorer {
    urgency: Vec<Regex>,
    banking_terms: Vec<Regex>,
    phishing: Vec<Regex>,
    sensitive_info: Vec<Regex>,
    upi_id: Regex,
    phone_number: Regex,
}

impl RuleScorer {
    /// Compile the indicator regex families.
    pub fn new() -> Result<Self> {
        let compile = |patterns: &[&str]| -> Result<Vec<Regex>> {
            patterns
                .iter()
                .map(|p| {
                    Regex::new(p).map_err(|e| Error::Config(format!("Invalid rule pattern: {}", e)))
                })
                .collect()
        };
        Ok(Self {
            urgency: compile(&[
                r"\b(urgent|immediately|asap|right now|hurry|quickly)\b",
                r"\b(blocked|suspended|frozen|locked|closed)\b",
                r"\b(within|today|hours left|final notice)\b",
                r"\b(will be|going to|about to)\b",
            ])?,
            banking_terms: compile(&[
                r"\b(verify|confirm|validate|authenticate)\b",
                r"\b(account|bank|upi|payment|transaction)\b",
            ])?,
            phishing: compile(&[
                r"https?://\S+",
                r"bit\.ly|tinyurl|short\.link",
                r"verify.*link|click.*here|visit.*url",
            ])?,
            sensitive_info: compile(&[
                r"\b(upi id|upi|account number|bank account|card number|pin|otp|cvv)\b",
                r"\b(share|send|provide|give|tell).*(upi|account|otp|pin)\b",
            ])?,
            upi_id: Regex::new(
                r"\b[\w.\-]+@(?:paytm|gpay|phonepe|ybl|axl|okicici|okaxis|okhdfcbank|oksbi|payzapp|upi)\b",
            )
            .map_err(|e| Error::Config(format!("Invalid rule pattern: {}", e)))?,
            phone_number: Regex::new(r"(?:\+91|91|0)?[6-9]\d{9}")
                .map_err(|e| Error::Config(format!("Invalid rule pattern: {}", e)))?,
        })
    }

    /// Score one message against all indicator families.
    pub fn score(&self, text: &str, history: &[Message]) -> RuleScore {
        let text = text.to_lowercase();
        let mut score = 0.0;
        let mut evidence = Vec::new();

        // Urgency: 0.15 per matching pattern, family capped at 0.4
        let urgency: f64 = self
            .urgency
            .iter()
            .filter(|p| p.is_match(&text))
            .map(|_| 0.15)
            .sum();
        if urgency > 0.0 {
            score += urgency.min(0.4);
            evidence.push("urgency language".to_string());
        }

        // Scam keywords: 0.2 each, capped at 0.4
        let keyword_matches: Vec<&str> = SCAM_KEYWORDS
            .iter()
            .filter(|k| text.contains(**k))
            .copied()
            .collect();
        if !keyword_matches.is_empty() {
            score += (keyword_matches.len() as f64 * 0.2).min(0.4);
            evidence.push(format!(
                "scam keywords: {}",
                keyword_matches
                    .iter()
                    .take(3)
                    .copied()
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }

        // Reward / lottery scams, boosted when combined with a payment handle
        if let Some(keyword) = REWARD_KEYWORDS.iter().find(|k| text.contains(**k)) {
            score += 0.4;
            evidence.push(format!("reward scam keyword: '{}'", keyword));
            if self.upi_id.is_match(&text) || self.phone_number.is_match(&text) {
                score += 0.3;
                evidence.push("reward scam with contact or payment handle".to_string());
            }
        }

        // Contextual banking terms carry low weight on their own
        if self.banking_terms.iter().any(|p| p.is_match(&text)) {
            score += 0.1;
            evidence.push("contextual banking terms".to_string());
        }

        if self.phishing.iter().any(|p| p.is_match(&text)) {
            score += 0.3;
            evidence.push("phishing link indicator".to_string());
        }

        if self.sensitive_info.iter().any(|p| p.is_match(&text)) {
            score += 0.2;
            evidence.push("sensitive info request".to_string());
        }

        // History echo: recent messages that already carried indicators
        let prior_hits = history
            .iter()
            .rev()
            .take(3)
            .filter(|m| self.quick_check(&m.text))
            .count();
        if prior_hits > 0 {
            score += 0.1 * prior_hits as f64;
            evidence.push(format!("{} recent messages with indicators", prior_hits));
        }

        RuleScore {
            score: score.min(1.0),
            evidence,
        }
    }

    fn quick_check(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        QUICK_CHECK_KEYWORDS.iter().any(|k| text.contains(k))
    }
}
