//! Session data model
//!
//! One `SessionState` per tracked conversation. The orchestrator is the only
//! writer; it borrows the state under the session lock for the duration of
//! one inbound message and must not retain it afterward.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Who authored a message.
///
/// On the wire the honeypot side is historically called `"user"`; both
/// `"agent"` and `"user"` are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderRole {
    /// The suspected scammer on the other end
    Scammer,
    /// The honeypot persona
    #[serde(alias = "user")]
    Agent,
}

/// A single message in a conversation. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message author
    pub sender: SenderRole,
    /// Message content
    pub text: String,
    /// RFC 3339 timestamp supplied by the caller
    pub timestamp: String,
}

impl Message {
    /// Create an inbound (scammer) message.
    pub fn inbound(text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            sender: SenderRole::Scammer,
            text: text.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Create an outbound (agent) message stamped now.
    pub fn outbound(text: impl Into<String>) -> Self {
        Self {
            sender: SenderRole::Agent,
            text: text.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Channel metadata passed through to reply generation, never interpreted
/// by the decision pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelMeta {
    /// Originating channel (SMS / WhatsApp / Email / Chat)
    pub channel: Option<String>,
    /// Language used
    pub language: Option<String>,
    /// Country or region
    pub locale: Option<String>,
}

/// Kind of harvested artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    UpiId,
    PhoneNumber,
    Url,
    BankAccount,
    Email,
}

impl ArtifactKind {
    /// Whether this kind identifies a payment destination.
    pub fn is_payment(&self) -> bool {
        matches!(self, ArtifactKind::UpiId | ArtifactKind::BankAccount)
    }

    /// Stable lowercase name for logs and notes.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::UpiId => "upi_id",
            ArtifactKind::PhoneNumber => "phone_number",
            ArtifactKind::Url => "url",
            ArtifactKind::BankAccount => "bank_account",
            ArtifactKind::Email => "email",
        }
    }
}

/// A piece of extracted intelligence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedArtifact {
    /// Artifact kind
    pub kind: ArtifactKind,
    /// Raw matched string as it appeared in the message
    pub raw: String,
    /// Normalized canonical form, unique per kind within a session
    pub canonical: String,
    /// Turn index at which the artifact was first seen
    pub first_seen_turn: u32,
}

/// Provenance of a detection verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictSource {
    Model,
    Rule,
    Fused,
}

/// The detector's judgment for one inbound message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionVerdict {
    /// Whether the message crosses the scam threshold
    pub is_scam: bool,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Which path produced the verdict
    pub source: VerdictSource,
    /// Short human-readable rationale
    pub rationale: String,
}

/// Current conversational objective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyTag {
    /// Engage noncommittally before committing to deception
    Stall,
    /// Ask questions aimed at surfacing identifying detail
    Probe,
    /// Steer toward payment handles
    Bait,
    /// Wind the conversation down
    Disengage,
}

/// Why a session terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Strategy reached Disengage with the target intelligence captured
    Disengaged,
    /// Max-turn ceiling reached
    MaxTurnsReached,
}

/// Durable-for-process-lifetime record of one conversation.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Opaque externally supplied identifier
    pub session_id: String,
    /// Ordered, append-only message history
    pub history: Vec<Message>,
    /// Harvested artifacts, unique per (kind, canonical)
    artifacts: Vec<ExtractedArtifact>,
    /// Dedup index over (kind, canonical)
    seen: HashSet<(ArtifactKind, String)>,
    /// Latest verdict, if any message has been detected on
    pub verdict: Option<DetectionVerdict>,
    /// Monotonic: once true, never reverts for the session's lifetime
    ever_flagged: bool,
    /// Inbound messages processed
    pub turn_count: u32,
    /// Current conversational objective
    pub current_strategy: StrategyTag,
    /// Set when the engagement loop has wound down
    pub terminated: bool,
    /// Why the session terminated, if it has
    pub termination_reason: Option<TerminationReason>,
    /// Set only after the callback transport succeeded
    pub callback_sent: bool,
    /// Channel metadata from the first request that carried any
    pub metadata: Option<ChannelMeta>,
    /// Free-text observations accumulated during the engagement
    pub notes: Vec<String>,
}

impl SessionState {
    /// Create an empty session.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            history: Vec::new(),
            artifacts: Vec::new(),
            seen: HashSet::new(),
            verdict: None,
            ever_flagged: false,
            turn_count: 0,
            current_strategy: StrategyTag::Stall,
            terminated: false,
            termination_reason: None,
            callback_sent: false,
            metadata: None,
            notes: Vec::new(),
        }
    }

    /// Append a message to the history.
    pub fn push_message(&mut self, message: Message) {
        self.history.push(message);
    }

    /// Record a verdict. `ever_flagged` only ever latches to true.
    pub fn record_verdict(&mut self, verdict: DetectionVerdict) {
        if verdict.is_scam {
            self.ever_flagged = true;
        }
        self.verdict = Some(verdict);
    }

    /// Whether any verdict in this session's lifetime flagged a scam.
    pub fn ever_flagged(&self) -> bool {
        self.ever_flagged
    }

    /// Merge an artifact into the session set.
    ///
    /// Returns `true` when the (kind, canonical) pair is new; re-detection
    /// of a known canonical value is a no-op.
    pub fn insert_artifact(&mut self, artifact: ExtractedArtifact) -> bool {
        let key = (artifact.kind, artifact.canonical.clone());
        if !self.seen.insert(key) {
            return false;
        }
        self.artifacts.push(artifact);
        true
    }

    /// All artifacts captured so far, in first-seen order.
    pub fn artifacts(&self) -> &[ExtractedArtifact] {
        &self.artifacts
    }

    /// Number of distinct artifact kinds captured.
    pub fn distinct_kinds(&self) -> usize {
        self.artifacts
            .iter()
            .map(|a| a.kind)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Whether any payment-relevant artifact has been captured.
    pub fn has_payment_artifact(&self) -> bool {
        self.artifacts.iter().any(|a| a.kind.is_payment())
    }

    /// Record a free-text observation.
    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(kind: ArtifactKind, canonical: &str) -> ExtractedArtifact {
        ExtractedArtifact {
            kind,
            raw: canonical.to_string(),
            canonical: canonical.to_string(),
            first_seen_turn: 1,
        }
    }

    #[test]
    fn test_artifact_dedup_by_kind_and_canonical() {
        let mut session = SessionState::new("s1");
        assert!(session.insert_artifact(artifact(ArtifactKind::UpiId, "fraud@paytm")));
        assert!(!session.insert_artifact(artifact(ArtifactKind::UpiId, "fraud@paytm")));
        assert_eq!(session.artifacts().len(), 1);

        // Same canonical under a different kind is a different artifact
        assert!(session.insert_artifact(artifact(ArtifactKind::Email, "fraud@paytm")));
        assert_eq!(session.artifacts().len(), 2);
        assert_eq!(session.distinct_kinds(), 2);
    }

    #[test]
    fn test_ever_flagged_is_monotonic() {
        let mut session = SessionState::new("s1");
        assert!(!session.ever_flagged());

        session.record_verdict(DetectionVerdict {
            is_scam: true,
            confidence: 0.9,
            source: VerdictSource::Rule,
            rationale: "test".to_string(),
        });
        assert!(session.ever_flagged());

        session.record_verdict(DetectionVerdict {
            is_scam: false,
            confidence: 0.1,
            source: VerdictSource::Model,
            rationale: "test".to_string(),
        });
        assert!(session.ever_flagged());
        assert!(!session.verdict.as_ref().unwrap().is_scam);
    }

    #[test]
    fn test_payment_artifact_detection() {
        let mut session = SessionState::new("s1");
        session.insert_artifact(artifact(ArtifactKind::PhoneNumber, "+919876543210"));
        assert!(!session.has_payment_artifact());
        session.insert_artifact(artifact(ArtifactKind::BankAccount, "1234567890123456"));
        assert!(session.has_payment_artifact());
    }

    #[test]
    fn test_sender_role_accepts_user_alias() {
        let msg: Message =
            serde_json::from_str(r#"{"sender":"user","text":"hi","timestamp":"t"}"#).unwrap();
        assert_eq!(msg.sender, SenderRole::Agent);
        let msg: Message =
            serde_json::from_str(r#"{"sender":"scammer","text":"hi","timestamp":"t"}"#).unwrap();
        assert_eq!(msg.sender, SenderRole::Scammer);
    }
}
