//! End-to-end pipeline tests with a scripted model and a counting callback
//! sink. No network, no live model: the mocks stand in at the same trait
//! seams the production wiring uses.

use async_trait::async_trait;
use scambait::agents::{PersonaAgent, SafetyGuard, StrategyAgent};
use scambait::config::ScamBaitConfig;
use scambait::detector::{RuleScorer, ScamDetector};
use scambait::engine::{
    CallbackPayload, CallbackSink, CallbackTrigger, EngineRequest, Orchestrator,
};
use scambait::intel::IntelExtractor;
use scambait::model::{GenerateRequest, ModelClient, ModelVerdict};
use scambait::session::{Message, SessionManager, StrategyTag};
use scambait::{Error, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Model stub: fixed classify outcome, fixed generate outcome.
struct MockModel {
    /// `None` simulates a model fault on classify
    verdict: Option<ModelVerdict>,
    /// `None` simulates a model fault on generate
    reply: Option<String>,
}

impl MockModel {
    fn offline() -> Self {
        Self {
            verdict: None,
            reply: None,
        }
    }

    fn replying(reply: &str) -> Self {
        Self {
            verdict: None,
            reply: Some(reply.to_string()),
        }
    }
}

#[async_trait]
impl ModelClient for MockModel {
    async fn classify(&self, _text: &str, _history: &[Message]) -> Result<ModelVerdict> {
        self.verdict
            .clone()
            .ok_or_else(|| Error::Model("mock classify offline".to_string()))
    }

    async fn generate(&self, _request: &GenerateRequest) -> Result<String> {
        self.reply
            .clone()
            .ok_or_else(|| Error::Model("mock generate offline".to_string()))
    }
}

/// Callback sink that records payloads and can fail its first N sends.
#[derive(Clone, Default)]
struct MockSink {
    payloads: Arc<Mutex<Vec<CallbackPayload>>>,
    attempts: Arc<AtomicUsize>,
    fail_first: usize,
}

#[async_trait]
impl CallbackSink for MockSink {
    async fn send(&self, payload: &CallbackPayload) -> Result<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.fail_first {
            return Err(Error::Callback("mock transport down".to_string()));
        }
        self.payloads.lock().unwrap().push(payload.clone());
        Ok(())
    }
}

impl MockSink {
    fn delivered(&self) -> Vec<CallbackPayload> {
        self.payloads.lock().unwrap().clone()
    }
}

fn build_engine(model: MockModel, sink: MockSink, max_retries: u32) -> Orchestrator {
    let config = ScamBaitConfig::default();
    let model: Arc<dyn ModelClient> = Arc::new(model);
    Orchestrator::new(
        Arc::new(SessionManager::new()),
        ScamDetector::new(
            model.clone(),
            RuleScorer::new().unwrap(),
            config.detection.confidence_threshold,
        ),
        IntelExtractor::new().unwrap(),
        StrategyAgent::new(
            config.engagement.target_artifact_kinds,
            config.engagement.max_turns,
        ),
        PersonaAgent::new(model, config.engagement.history_window),
        SafetyGuard::new(),
        CallbackTrigger::new(Box::new(sink), max_retries, Duration::from_millis(1)),
        &config,
    )
}

fn inbound(session_id: &str, text: &str) -> EngineRequest {
    EngineRequest {
        session_id: session_id.to_string(),
        message: Message::inbound(text, "2026-01-01T00:00:00Z"),
        history: Vec::new(),
        metadata: None,
    }
}

#[tokio::test]
async fn test_account_block_message_flags_and_stalls() {
    let sink = MockSink::default();
    let engine = build_engine(MockModel::offline(), sink.clone(), 0);

    let outcome = engine
        .handle_message(inbound(
            "s1",
            "Your account will be blocked. Verify immediately.",
        ))
        .await;

    assert!(outcome.scam_detected);
    assert_eq!(outcome.strategy, StrategyTag::Stall);
    assert!(outcome.reply.contains('?'), "reply was: {}", outcome.reply);
    assert!(!outcome.callback_fired);
    assert!(sink.delivered().is_empty());
}

#[tokio::test]
async fn test_benign_session_gets_neutral_reply() {
    let sink = MockSink::default();
    let engine = build_engine(
        MockModel {
            verdict: Some(ModelVerdict {
                is_scam: false,
                confidence: 0.05,
                reason: "ordinary chat".to_string(),
            }),
            reply: Some("should not be used".to_string()),
        },
        sink.clone(),
        0,
    );

    let outcome = engine
        .handle_message(inbound("s1", "hey, are we still on for lunch?"))
        .await;

    assert!(!outcome.scam_detected);
    assert_eq!(outcome.reply, "Okay, I see. What is this regarding?");
    assert!(sink.delivered().is_empty());
}

#[tokio::test]
async fn test_upi_then_phone_disengages_with_one_callback() {
    let sink = MockSink::default();
    let engine = build_engine(MockModel::replying("Okay, what do I do?"), sink.clone(), 0);

    engine
        .handle_message(inbound(
            "s1",
            "Your account will be blocked. Verify immediately.",
        ))
        .await;
    let turn2 = engine
        .handle_message(inbound("s1", "Pay the reactivation fee to recovery@ybl now"))
        .await;
    assert!(!turn2.callback_fired);

    let turn3 = engine
        .handle_message(inbound("s1", "Or call our officer at 9876543210 urgently"))
        .await;

    assert_eq!(turn3.strategy, StrategyTag::Disengage);
    assert!(turn3.callback_fired);

    let delivered = sink.delivered();
    assert_eq!(delivered.len(), 1);
    let intel = &delivered[0].extracted_intelligence;
    assert_eq!(intel.upi_ids, vec!["recovery@ybl"]);
    assert_eq!(intel.phone_numbers, vec!["+919876543210"]);
    assert!(delivered[0].scam_detected);

    // Later traffic on a terminated session never fires a second callback
    let turn4 = engine.handle_message(inbound("s1", "hello? still there?")).await;
    assert!(!turn4.callback_fired);
    assert_eq!(sink.delivered().len(), 1);
}

#[tokio::test]
async fn test_artifacts_harvested_before_session_is_flagged() {
    let sink = MockSink::default();
    let engine = build_engine(
        MockModel {
            verdict: Some(ModelVerdict {
                is_scam: false,
                confidence: 0.1,
                reason: "looks harmless".to_string(),
            }),
            reply: Some("Okay, noted.".to_string()),
        },
        sink.clone(),
        0,
    );

    // Turn 1 scores benign but leaks a payment handle
    let turn1 = engine
        .handle_message(inbound("s1", "my handle is refund@ybl"))
        .await;
    assert!(!turn1.scam_detected);
    assert_eq!(turn1.reply, "Okay, I see. What is this regarding?");
    {
        let handle = engine.sessions().get("s1").unwrap();
        let session = handle.lock().await;
        assert_eq!(session.artifacts().len(), 1);
        assert_eq!(session.artifacts()[0].canonical, "refund@ybl");
        assert_eq!(session.artifacts()[0].first_seen_turn, 1);
    }

    // Turn 2 flags via the rule path; turn 3 completes the target kinds
    let turn2 = engine
        .handle_message(inbound(
            "s1",
            "Your account will be blocked. Verify immediately.",
        ))
        .await;
    assert!(turn2.scam_detected);

    let turn3 = engine
        .handle_message(inbound("s1", "call me at 9876543210 please"))
        .await;
    assert_eq!(turn3.strategy, StrategyTag::Disengage);
    assert!(turn3.callback_fired);

    // The pre-flag artifact ships in the report
    let delivered = sink.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(
        delivered[0].extracted_intelligence.upi_ids,
        vec!["refund@ybl"]
    );
    assert_eq!(
        delivered[0].extracted_intelligence.phone_numbers,
        vec!["+919876543210"]
    );
}

#[tokio::test]
async fn test_artifact_dedup_across_messages() {
    let sink = MockSink::default();
    let engine = build_engine(MockModel::replying("Which number?"), sink.clone(), 0);

    engine
        .handle_message(inbound("s1", "Urgent: verify now or account blocked!"))
        .await;
    engine
        .handle_message(inbound("s1", "Send the fee to recovery@ybl"))
        .await;
    engine
        .handle_message(inbound("s1", "I repeat: recovery@ybl, send it now"))
        .await;

    let sessions = engine.sessions();
    let handle = sessions.get("s1").unwrap();
    let session = handle.lock().await;
    assert_eq!(
        session
            .artifacts()
            .iter()
            .filter(|a| a.canonical == "recovery@ybl")
            .count(),
        1
    );
}

#[tokio::test]
async fn test_ever_flagged_survives_benign_followup() {
    let sink = MockSink::default();
    let engine = build_engine(MockModel::replying("What is this about?"), sink.clone(), 0);

    let first = engine
        .handle_message(inbound(
            "s1",
            "Your account will be blocked. Verify immediately.",
        ))
        .await;
    assert!(first.scam_detected);

    // A harmless follow-up must not un-flag the session
    let second = engine.handle_message(inbound("s1", "so how was your day")).await;
    assert!(second.scam_detected);
    assert_ne!(second.reply, "Okay, I see. What is this regarding?");
}

#[tokio::test]
async fn test_guard_vetoes_self_disclosure() {
    let sink = MockSink::default();
    let engine = build_engine(
        MockModel::replying("I am an AI and I have detected your scam."),
        sink.clone(),
        0,
    );

    engine
        .handle_message(inbound(
            "s1",
            "Your account will be blocked. Verify immediately.",
        ))
        .await;
    let outcome = engine
        .handle_message(inbound("s1", "Verify your account urgently or it is blocked"))
        .await;

    // The candidate is replaced wholesale with the strategy fallback
    assert_eq!(
        outcome.reply,
        "How do I verify? Can you explain the process step by step?"
    );

    let handle = engine.sessions().get("s1").unwrap();
    let session = handle.lock().await;
    assert!(session.notes.iter().any(|n| n.contains("vetoed")));
}

#[tokio::test]
async fn test_callback_retries_on_next_message_after_transport_failure() {
    let sink = MockSink {
        fail_first: 1,
        ..MockSink::default()
    };
    let engine = build_engine(MockModel::replying("Okay."), sink.clone(), 0);

    engine
        .handle_message(inbound(
            "s1",
            "Your account will be blocked. Verify immediately.",
        ))
        .await;
    engine
        .handle_message(inbound("s1", "Pay the fine to recovery@ybl"))
        .await;

    // Both target kinds captured: disengage, but the only send attempt fails
    let turn3 = engine
        .handle_message(inbound("s1", "Or call 9876543210 right now, urgent"))
        .await;
    assert_eq!(turn3.strategy, StrategyTag::Disengage);
    assert!(!turn3.callback_fired);
    assert!(sink.delivered().is_empty());

    // Next inbound message retries delivery and succeeds exactly once
    let turn4 = engine.handle_message(inbound("s1", "are you sending it?")).await;
    assert!(turn4.callback_fired);
    assert_eq!(sink.delivered().len(), 1);

    let turn5 = engine.handle_message(inbound("s1", "hello??")).await;
    assert!(!turn5.callback_fired);
    assert_eq!(sink.delivered().len(), 1);
}

#[tokio::test]
async fn test_same_session_messages_serialize() {
    let sink = MockSink::default();
    let engine = Arc::new(build_engine(MockModel::replying("Okay?"), sink, 0));

    let a = {
        let engine = engine.clone();
        tokio::spawn(async move {
            engine
                .handle_message(inbound("s1", "Urgent: your account is blocked, verify!"))
                .await
        })
    };
    let b = {
        let engine = engine.clone();
        tokio::spawn(async move {
            engine
                .handle_message(inbound("s1", "Send otp immediately to avoid suspension"))
                .await
        })
    };
    a.await.unwrap();
    b.await.unwrap();

    let handle = engine.sessions().get("s1").unwrap();
    let session = handle.lock().await;
    assert_eq!(session.turn_count, 2);
    // Each inbound message is immediately followed by its reply
    assert_eq!(session.history.len(), 4);
    assert_eq!(session.history[0].sender, session.history[2].sender);
    assert_ne!(session.history[0].sender, session.history[1].sender);
}

#[tokio::test]
async fn test_distinct_sessions_are_independent() {
    let sink = MockSink::default();
    let engine = build_engine(MockModel::replying("What?"), sink, 0);

    let flagged = engine
        .handle_message(inbound(
            "scam-session",
            "Your account will be blocked. Verify immediately.",
        ))
        .await;
    let benign = engine
        .handle_message(inbound("friendly-session", "hi, lunch tomorrow?"))
        .await;

    assert!(flagged.scam_detected);
    assert!(!benign.scam_detected);
    assert_eq!(engine.sessions().session_count(), 2);
}

#[tokio::test]
async fn test_caller_history_adopted_once() {
    let sink = MockSink::default();
    let engine = build_engine(MockModel::replying("Hm, why?"), sink, 0);

    let prior = vec![
        Message::inbound("hello", "2026-01-01T00:00:00Z"),
        Message::outbound("hi there"),
    ];
    engine
        .handle_message(EngineRequest {
            session_id: "s1".to_string(),
            message: Message::inbound("verify your account now, urgent!", "2026-01-01T00:01:00Z"),
            history: prior,
            metadata: None,
        })
        .await;

    let handle = engine.sessions().get("s1").unwrap();
    {
        let session = handle.lock().await;
        // 2 adopted + inbound + reply
        assert_eq!(session.history.len(), 4);
        assert_eq!(session.turn_count, 1);
    }

    // A second request with a stale caller copy must not overwrite
    engine
        .handle_message(EngineRequest {
            session_id: "s1".to_string(),
            message: Message::inbound("do it now or account blocked", "2026-01-01T00:02:00Z"),
            history: vec![Message::inbound("stale", "t")],
            metadata: None,
        })
        .await;
    let session = handle.lock().await;
    assert!(!session.history.iter().any(|m| m.text == "stale"));
    assert_eq!(session.history.len(), 6);
}
