//! Outbound reply safety gate
//!
//! Pure deny-list check over every candidate reply before it leaves the
//! process. A veto substitutes the strategy's canned fallback line; the gate
//! itself never errors and never calls the model.

use crate::model::prompts;
use crate::session::StrategyTag;

/// Category of a deny-list violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// Reveals the honeypot's artificial nature
    SelfDisclosure,
    /// Leaks pipeline internals
    MetaLeak,
    /// Claims an official identity
    Impersonation,
    /// Instructs a payment or transfer
    IllegalInstruction,
    /// Volunteers sensitive personal data
    PersonalData,
    /// Too short or too long to pass as a human reply
    LengthBounds,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::SelfDisclosure => "self_disclosure",
            ViolationKind::MetaLeak => "meta_leak",
            ViolationKind::Impersonation => "impersonation",
            ViolationKind::IllegalInstruction => "illegal_instruction",
            ViolationKind::PersonalData => "personal_data",
            ViolationKind::LengthBounds => "length_bounds",
        }
    }
}

/// Phrases that must never appear in an outbound reply.
const DENY_LIST: &[(&str, ViolationKind)] = &[
    // The persona must never break character
    ("i am an ai", ViolationKind::SelfDisclosure),
    ("i'm an ai", ViolationKind::SelfDisclosure),
    ("as an ai", ViolationKind::SelfDisclosure),
    ("i am a bot", ViolationKind::SelfDisclosure),
    ("i'm a bot", ViolationKind::SelfDisclosure),
    ("language model", ViolationKind::SelfDisclosure),
    ("honeypot", ViolationKind::SelfDisclosure),
    ("detection system", ViolationKind::SelfDisclosure),
    ("i am a system", ViolationKind::SelfDisclosure),
    // Pipeline internals
    ("our system", ViolationKind::MetaLeak),
    ("scam detection", ViolationKind::MetaLeak),
    ("confidence score", ViolationKind::MetaLeak),
    ("rule-based", ViolationKind::MetaLeak),
    ("flagged your message", ViolationKind::MetaLeak),
    ("intelligence report", ViolationKind::MetaLeak),
    // Official identities
    ("i am from the bank", ViolationKind::Impersonation),
    ("i work for the bank", ViolationKind::Impersonation),
    ("this is the police", ViolationKind::Impersonation),
    ("i am a government official", ViolationKind::Impersonation),
    // Payment instructions
    ("transfer the money", ViolationKind::IllegalInstruction),
    ("send the payment to", ViolationKind::IllegalInstruction),
    ("pay the fee to", ViolationKind::IllegalInstruction),
    ("i will send you money", ViolationKind::IllegalInstruction),
    // Sensitive data
    ("my otp is", ViolationKind::PersonalData),
    ("my pin is", ViolationKind::PersonalData),
    ("my cvv is", ViolationKind::PersonalData),
    ("my account number is", ViolationKind::PersonalData),
    ("my upi id is", ViolationKind::PersonalData),
    ("my password is", ViolationKind::PersonalData),
];

const MIN_REPLY_LEN: usize = 5;
const MAX_REPLY_LEN: usize = 500;

/// Gate outcome: either the candidate unchanged or a substituted fallback.
#[derive(Debug, Clone)]
pub struct GuardedReply {
    /// Text cleared to leave the process
    pub text: String,
    /// Whether the candidate was rejected
    pub vetoed: bool,
    /// Matched phrase and its category, when vetoed
    pub violation: Option<(String, ViolationKind)>,
}

/// Deny-list gate over outbound replies.
#[derive(Debug, Clone, Default)]
pub struct SafetyGuard;

impl SafetyGuard {
    pub fn new() -> Self {
        Self
    }

    /// Validate a candidate reply. A veto substitutes the strategy's
    /// fallback line, which is itself exempt from re-checking.
    pub fn validate(&self, candidate: &str, strategy: StrategyTag) -> GuardedReply {
        let lowered = candidate.to_lowercase();

        for (phrase, kind) in DENY_LIST {
            if lowered.contains(phrase) {
                tracing::warn!(
                    violation = kind.as_str(),
                    phrase = phrase,
                    "reply vetoed, substituting fallback"
                );
                return GuardedReply {
                    text: prompts::fallback_line(strategy).to_string(),
                    vetoed: true,
                    violation: Some((phrase.to_string(), *kind)),
                };
            }
        }

        let len = candidate.trim().chars().count();
        if len < MIN_REPLY_LEN || len > MAX_REPLY_LEN {
            return GuardedReply {
                text: prompts::fallback_line(strategy).to_string(),
                vetoed: true,
                violation: Some((format!("length {}", len), ViolationKind::LengthBounds)),
            };
        }

        GuardedReply {
            text: candidate.to_string(),
            vetoed: false,
            violation: None,
        }
    }
}
