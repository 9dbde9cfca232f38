//! Final intelligence callback
//!
//! One payload per session, delivered at most once. The transport sits
//! behind the [`CallbackSink`] trait so tests can count deliveries; the
//! trigger retries a bounded number of times with fixed backoff and only
//! reports success after the transport accepted the payload.

use crate::config::CallbackConfig;
use crate::error::{Error, Result};
use crate::session::{ArtifactKind, Message, SessionState, TerminationReason};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Artifacts grouped by kind for the report consumer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntelligenceReport {
    pub bank_accounts: Vec<String>,
    pub upi_ids: Vec<String>,
    pub phishing_links: Vec<String>,
    pub phone_numbers: Vec<String>,
    pub emails: Vec<String>,
}

/// Immutable snapshot shipped when a session winds down.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackPayload {
    pub session_id: String,
    pub scam_detected: bool,
    pub total_messages_exchanged: usize,
    pub extracted_intelligence: IntelligenceReport,
    pub conversation_history: Vec<Message>,
    pub termination_reason: Option<TerminationReason>,
    pub agent_notes: String,
}

impl CallbackPayload {
    /// Snapshot a session at termination time.
    pub fn from_session(session: &SessionState) -> Self {
        let mut intel = IntelligenceReport::default();
        for artifact in session.artifacts() {
            let canonical = artifact.canonical.clone();
            match artifact.kind {
                ArtifactKind::BankAccount => intel.bank_accounts.push(canonical),
                ArtifactKind::UpiId => intel.upi_ids.push(canonical),
                ArtifactKind::Url => intel.phishing_links.push(canonical),
                ArtifactKind::PhoneNumber => intel.phone_numbers.push(canonical),
                ArtifactKind::Email => intel.emails.push(canonical),
            }
        }
        Self {
            session_id: session.session_id.clone(),
            scam_detected: session.ever_flagged(),
            total_messages_exchanged: session.history.len(),
            extracted_intelligence: intel,
            conversation_history: session.history.clone(),
            termination_reason: session.termination_reason,
            agent_notes: session.notes.join("; "),
        }
    }
}

/// Transport for the final report.
#[async_trait]
pub trait CallbackSink: Send + Sync {
    async fn send(&self, payload: &CallbackPayload) -> Result<()>;
}

/// HTTP sink: POSTs the payload as JSON to a fixed URL.
pub struct HttpCallbackSink {
    http: reqwest::Client,
    url: String,
}

impl HttpCallbackSink {
    pub fn new(config: &CallbackConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl CallbackSink for HttpCallbackSink {
    async fn send(&self, payload: &CallbackPayload) -> Result<()> {
        let response = self.http.post(&self.url).json(payload).send().await?;
        if !response.status().is_success() {
            return Err(Error::Callback(format!(
                "Callback rejected with status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Bounded-retry dispatcher over a [`CallbackSink`].
pub struct CallbackTrigger {
    sink: Box<dyn CallbackSink>,
    max_retries: u32,
    backoff: Duration,
}

impl CallbackTrigger {
    pub fn new(sink: Box<dyn CallbackSink>, max_retries: u32, backoff: Duration) -> Self {
        Self {
            sink,
            max_retries,
            backoff,
        }
    }

    /// Deliver a payload, retrying on transport failure.
    ///
    /// Returns `Ok(())` only when the sink accepted the payload; the caller
    /// sets `callback_sent` solely on that outcome.
    pub async fn dispatch(&self, payload: &CallbackPayload) -> Result<()> {
        let mut last_error = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tokio::time::sleep(self.backoff).await;
            }
            match self.sink.send(payload).await {
                Ok(()) => {
                    tracing::info!(
                        session_id = %payload.session_id,
                        attempt = attempt + 1,
                        "callback delivered"
                    );
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(
                        session_id = %payload.session_id,
                        attempt = attempt + 1,
                        error = %e,
                        "callback attempt failed"
                    );
                    last_error = Some(e);
                }
            }
        }
        Err(last_error
            .unwrap_or_else(|| Error::Callback("Callback failed with no attempts".to_string())))
    }
}
