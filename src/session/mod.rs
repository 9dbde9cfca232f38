//! Session state and lifecycle management

mod manager;
mod state;

pub use manager::{SessionHandle, SessionManager};
pub use state::{
    ArtifactKind, ChannelMeta, DetectionVerdict, ExtractedArtifact, Message, SenderRole,
    SessionState, StrategyTag, TerminationReason, VerdictSource,
};
