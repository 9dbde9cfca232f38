//! Engagement engine
//!
//! Ties the pipeline together: the per-message orchestrator and the one-shot
//! intelligence callback.

mod callback;
mod orchestrator;

pub use callback::{
    CallbackPayload, CallbackSink, CallbackTrigger, HttpCallbackSink, IntelligenceReport,
};
pub use orchestrator::{EngineReply, EngineRequest, Orchestrator};
