//! Engagement agents
//!
//! Three cooperating pieces sit between detection and the wire: a pure
//! strategy selector, a model-backed persona, and a deny-list safety gate
//! with final say over every outbound reply.

mod guard;
mod persona;
mod strategy;

pub use guard::{GuardedReply, SafetyGuard, ViolationKind};
pub use persona::PersonaAgent;
pub use strategy::StrategyAgent;
