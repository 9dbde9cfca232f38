//! External generative model client
//!
//! The decision pipeline talks to the model through the narrow
//! [`ModelClient`] trait: a structured scam judgment and free-text reply
//! generation. Both calls carry a bounded timeout, and a failure is always
//! distinguishable from a semantically negative result — callers recover
//! locally (rule fallback, canned reply) and never surface model faults.

mod groq;
pub mod prompts;

pub use groq::GroqClient;

use crate::error::Result;
use crate::session::{ChannelMeta, Message, StrategyTag};
use async_trait::async_trait;

/// Structured judgment returned by the model's classify path.
#[derive(Debug, Clone)]
pub struct ModelVerdict {
    /// Whether the model considers the message a scam
    pub is_scam: bool,
    /// Model confidence in [0, 1]
    pub confidence: f64,
    /// Brief explanation
    pub reason: String,
}

/// Context for one reply generation.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Conversational objective chosen by the strategy agent
    pub strategy: StrategyTag,
    /// The inbound message being replied to
    pub current_text: String,
    /// Bounded recent history, oldest first
    pub history: Vec<Message>,
    /// Channel metadata passed through unmodified
    pub metadata: Option<ChannelMeta>,
}

/// Narrow interface to the external generative model.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Ask the model whether `text` is a scam attempt.
    async fn classify(&self, text: &str, history: &[Message]) -> Result<ModelVerdict>;

    /// Generate a persona reply for the given context.
    async fn generate(&self, request: &GenerateRequest) -> Result<String>;
}
