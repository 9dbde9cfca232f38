//! Intelligence extraction
//!
//! Pure pattern matching over message text. Total and idempotent: the same
//! text always yields the same hits, and an absence of matches yields an
//! empty set. Turn bookkeeping and deduplication against the session's
//! artifact set happen in the orchestrator, not here.

use crate::error::{Error, Result};
use crate::session::ArtifactKind;
use regex::Regex;

/// A single raw match produced by the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactHit {
    /// Artifact kind
    pub kind: ArtifactKind,
    /// Raw matched string
    pub raw: String,
    /// Normalized canonical form
    pub canonical: String,
}

/// Stateless extractor running a fixed ordered list of matchers, one per
/// artifact kind.
#[derive(Debug)]
pub struct IntelExtractor {
    bank_account: Regex,
    upi_id: Regex,
    phone_number: Regex,
    url: Regex,
    email: Regex,
}

impl IntelExtractor {
    /// Compile the matcher set.
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| Error::Config(format!("Invalid extraction pattern: {}", e)))
        };
        Ok(Self {
            bank_account: compile(r"\b\d{4}[-.\s]?\d{4}[-.\s]?\d{4}[-.\s]?\d{4}\b")?,
            upi_id: compile(
                r"(?i)\b[\w.\-]+@(?:paytm|gpay|phonepe|ybl|axl|okicici|okaxis|okhdfcbank|oksbi|payzapp|upi)\b",
            )?,
            phone_number: compile(r"(?:\+91|91|0)?[6-9]\d{9}")?,
            url: compile(r#"https?://[^\s<>"']+"#)?,
            email: compile(r"\b[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}\b")?,
        })
    }

    /// Extract all artifacts from one message text.
    ///
    /// Matchers run independently; a single message may yield multiple
    /// kinds. Hits are deduplicated by (kind, canonical) within this call.
    pub fn extract(&self, text: &str) -> Vec<ArtifactHit> {
        let mut hits: Vec<ArtifactHit> = Vec::new();
        let mut push = |kind: ArtifactKind, raw: &str, canonical: String| {
            if canonical.is_empty() {
                return;
            }
            if hits
                .iter()
                .any(|h| h.kind == kind && h.canonical == canonical)
            {
                return;
            }
            hits.push(ArtifactHit {
                kind,
                raw: raw.to_string(),
                canonical,
            });
        };

        for m in self.bank_account.find_iter(text) {
            push(
                ArtifactKind::BankAccount,
                m.as_str(),
                strip_separators(m.as_str()),
            );
        }
        for m in self.upi_id.find_iter(text) {
            push(ArtifactKind::UpiId, m.as_str(), m.as_str().to_lowercase());
        }
        for m in self.phone_number.find_iter(text) {
            // Skip matches embedded in a longer digit run (e.g. inside a
            // 16-digit account number).
            if digit_adjacent(text, m.start(), m.end()) {
                continue;
            }
            push(
                ArtifactKind::PhoneNumber,
                m.as_str(),
                canonical_phone(m.as_str()),
            );
        }
        for m in self.url.find_iter(text) {
            let raw = m.as_str().trim_end_matches(['.', ',', ')', ';']);
            push(ArtifactKind::Url, raw, canonical_url(raw));
        }
        for m in self.email.find_iter(text) {
            push(ArtifactKind::Email, m.as_str(), m.as_str().to_lowercase());
        }

        hits
    }
}

/// Remove account-number separators.
fn strip_separators(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Normalize a phone match to `+91` form using its last 10 digits.
fn canonical_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 10 {
        return String::new();
    }
    format!("+91{}", &digits[digits.len() - 10..])
}

/// Lowercase the scheme and host of a URL; path and query keep their case.
fn canonical_url(raw: &str) -> String {
    if let Some(scheme_end) = raw.find("://") {
        let host_start = scheme_end + 3;
        let host_end = raw[host_start..]
            .find('/')
            .map(|i| host_start + i)
            .unwrap_or(raw.len());
        let (prefix, rest) = raw.split_at(host_end);
        format!("{}{}", prefix.to_lowercase(), rest)
    } else {
        raw.to_lowercase()
    }
}

/// True when the match is flanked by another ASCII digit in the source text.
fn digit_adjacent(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    before.is_some_and(|c| c.is_ascii_digit()) || after.is_some_and(|c| c.is_ascii_digit())
}
