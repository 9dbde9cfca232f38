//! Per-message pipeline
//!
//! The orchestrator runs the full sequence for one inbound message under the
//! session lock: reconcile history, extract intelligence, detect, choose a
//! strategy, generate and gate a reply, and fire the one-shot callback when
//! the engagement winds down. Two messages for the same session serialize;
//! different sessions proceed in parallel.

use crate::agents::{PersonaAgent, SafetyGuard, StrategyAgent};
use crate::config::ScamBaitConfig;
use crate::detector::ScamDetector;
use crate::engine::callback::{CallbackPayload, CallbackTrigger};
use crate::intel::IntelExtractor;
use crate::model::prompts;
use crate::session::{
    ChannelMeta, ExtractedArtifact, Message, SessionManager, StrategyTag, TerminationReason,
};
use std::sync::Arc;

/// One inbound message with its caller-supplied context.
#[derive(Debug, Clone)]
pub struct EngineRequest {
    pub session_id: String,
    pub message: Message,
    /// Optional caller copy of prior history; stored history wins
    pub history: Vec<Message>,
    pub metadata: Option<ChannelMeta>,
}

/// Outcome of one pipeline pass.
#[derive(Debug, Clone)]
pub struct EngineReply {
    pub reply: String,
    pub scam_detected: bool,
    pub strategy: StrategyTag,
    pub callback_fired: bool,
}

/// Owns the pipeline components and drives them per message.
pub struct Orchestrator {
    sessions: Arc<SessionManager>,
    detector: ScamDetector,
    extractor: IntelExtractor,
    strategy: StrategyAgent,
    persona: PersonaAgent,
    guard: SafetyGuard,
    callback: CallbackTrigger,
    max_turns: u32,
}

impl Orchestrator {
    pub fn new(
        sessions: Arc<SessionManager>,
        detector: ScamDetector,
        extractor: IntelExtractor,
        strategy: StrategyAgent,
        persona: PersonaAgent,
        guard: SafetyGuard,
        callback: CallbackTrigger,
        config: &ScamBaitConfig,
    ) -> Self {
        Self {
            sessions,
            detector,
            extractor,
            strategy,
            persona,
            guard,
            callback,
            max_turns: config.engagement.max_turns,
        }
    }

    /// Process one inbound message end to end.
    pub async fn handle_message(&self, request: EngineRequest) -> EngineReply {
        let handle = self.sessions.get_or_create(&request.session_id);
        let mut session = handle.lock().await;

        // First sight of this session: adopt the caller's history copy
        if session.history.is_empty() && !request.history.is_empty() {
            session.history = request.history;
        }
        if session.metadata.is_none() {
            session.metadata = request.metadata;
        }

        let inbound_text = request.message.text.clone();
        session.push_message(request.message);
        session.turn_count += 1;
        let turn = session.turn_count;

        // Passive harvesting runs on every message, flagged or not
        for hit in self.extractor.extract(&inbound_text) {
            let artifact = ExtractedArtifact {
                kind: hit.kind,
                raw: hit.raw,
                canonical: hit.canonical,
                first_seen_turn: turn,
            };
            let kind = artifact.kind;
            let canonical = artifact.canonical.clone();
            if session.insert_artifact(artifact) {
                tracing::info!(
                    session_id = %session.session_id,
                    kind = kind.as_str(),
                    canonical = %canonical,
                    "artifact captured"
                );
                session.note(format!("captured {} {}", kind.as_str(), canonical));
            }
        }

        // Strategy reflects what was known before this message: a session
        // flagged for the first time this turn still stalls, and this
        // turn's verdict steers the next turn.
        let strategy = self.strategy.select(&session);

        let history_before = &session.history[..session.history.len() - 1];
        let verdict = self.detector.detect(&inbound_text, history_before).await;
        tracing::info!(
            session_id = %session.session_id,
            turn = turn,
            is_scam = verdict.is_scam,
            confidence = verdict.confidence,
            source = ?verdict.source,
            "verdict recorded"
        );
        session.record_verdict(verdict);

        let reply = if session.ever_flagged() {
            let candidate = self.persona.generate_reply(&session, strategy).await;
            let guarded = self.guard.validate(&candidate, strategy);
            if let Some((phrase, kind)) = &guarded.violation {
                session.note(format!("reply vetoed ({}): {}", kind.as_str(), phrase));
            }
            session.current_strategy = strategy;
            guarded.text
        } else {
            prompts::NEUTRAL_REPLY.to_string()
        };
        session.push_message(Message::outbound(reply.clone()));

        // Wind-down: one callback per session, set callback_sent only on
        // transport success so a later message can retry delivery
        let mut callback_fired = false;
        let should_terminate =
            strategy == StrategyTag::Disengage || session.turn_count >= self.max_turns;
        if should_terminate && !session.callback_sent {
            session.terminated = true;
            if session.termination_reason.is_none() {
                session.termination_reason = Some(if strategy == StrategyTag::Disengage {
                    TerminationReason::Disengaged
                } else {
                    TerminationReason::MaxTurnsReached
                });
            }
            let payload = CallbackPayload::from_session(&session);
            match self.callback.dispatch(&payload).await {
                Ok(()) => {
                    session.callback_sent = true;
                    callback_fired = true;
                }
                Err(e) => {
                    tracing::error!(
                        session_id = %session.session_id,
                        error = %e,
                        "callback delivery failed, will retry on next message"
                    );
                }
            }
        }

        EngineReply {
            reply,
            scam_detected: session.ever_flagged(),
            strategy,
            callback_fired,
        }
    }

    /// Shared session manager, for introspection endpoints.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }
}
