//! Persona reply generation
//!
//! Model-backed replies in a fixed "ordinary worried person" voice. This
//! agent never fails: a model fault degrades to the strategy's canned
//! fallback line so the other side always gets a plausible reply.

use crate::model::{prompts, GenerateRequest, ModelClient};
use crate::session::{SessionState, StrategyTag};
use std::sync::Arc;

/// Model-backed reply generator with canned fallbacks.
pub struct PersonaAgent {
    model: Arc<dyn ModelClient>,
    history_window: usize,
}

impl PersonaAgent {
    pub fn new(model: Arc<dyn ModelClient>, history_window: usize) -> Self {
        Self {
            model,
            history_window,
        }
    }

    /// Generate a reply to the most recent inbound message.
    ///
    /// The last history entry is treated as the message being replied to;
    /// only the most recent window of earlier turns is sent to the model.
    pub async fn generate_reply(&self, session: &SessionState, strategy: StrategyTag) -> String {
        let current_text = session
            .history
            .last()
            .map(|m| m.text.clone())
            .unwrap_or_default();

        let prior = &session.history[..session.history.len().saturating_sub(1)];
        let window_start = prior.len().saturating_sub(self.history_window);

        let request = GenerateRequest {
            strategy,
            current_text,
            history: prior[window_start..].to_vec(),
            metadata: session.metadata.clone(),
        };

        match self.model.generate(&request).await {
            Ok(raw) => {
                let reply = clean_reply(&raw);
                if reply.is_empty() {
                    tracing::warn!(
                        session_id = %session.session_id,
                        "model returned empty reply, using fallback"
                    );
                    prompts::fallback_line(strategy).to_string()
                } else {
                    reply
                }
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %session.session_id,
                    error = %e,
                    "reply generation failed, using fallback"
                );
                prompts::fallback_line(strategy).to_string()
            }
        }
    }
}

/// Strip completion artifacts: surrounding quotes and `Response:`-style
/// prefixes the model sometimes echoes back.
fn clean_reply(raw: &str) -> String {
    let mut text = raw.trim();
    for prefix in ["Response:", "Reply:", "You:"] {
        if let Some(stripped) = text.strip_prefix(prefix) {
            text = stripped.trim();
        }
    }
    let text = text.trim_matches('"').trim_matches('\'').trim();
    text.to_string()
}
