//! ScamBait - Honeypot Session Engine
//!
//! A conversational honeypot that poses as a vulnerable human target.
//! Per inbound message it classifies scam intent (model-first with a
//! deterministic rule fallback), passively harvests payment handles and
//! contact artifacts, picks an engagement strategy, generates a persona
//! reply gated by a safety deny-list, and reports the collected
//! intelligence to an external collector exactly once per session.
//!
//! ## Architecture
//!
//! - [`session`] — per-session state and the concurrent session manager
//! - [`intel`] — regex artifact extraction and canonicalization
//! - [`detector`] — scam classification with model/rule fusion
//! - [`model`] — Groq chat-completions client behind a narrow trait
//! - [`agents`] — strategy selection, persona replies, safety gate
//! - [`engine`] — per-message orchestration and the one-shot callback
//! - [`api`] — axum HTTP ingress

pub mod agents;
pub mod api;
pub mod config;
pub mod detector;
pub mod engine;
pub mod error;
pub mod intel;
pub mod model;
pub mod session;

pub use config::ScamBaitConfig;
pub use error::{Error, Result};
