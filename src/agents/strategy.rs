//! Conversational strategy selection
//!
//! Pure decision table over session state. No randomness, no model calls:
//! the same session snapshot always yields the same strategy.

use crate::session::{SessionState, StrategyTag};

/// Deterministic strategy selector.
#[derive(Debug, Clone)]
pub struct StrategyAgent {
    target_kinds: usize,
    max_turns: u32,
}

impl StrategyAgent {
    pub fn new(target_kinds: usize, max_turns: u32) -> Self {
        Self {
            target_kinds,
            max_turns,
        }
    }

    /// Pick the conversational objective for the current turn.
    ///
    /// Disengage once enough distinct intelligence is captured or the turn
    /// ceiling is hit; otherwise Probe until a payment handle surfaces, then
    /// Bait for more. Sessions never flagged stay in Stall.
    pub fn select(&self, session: &SessionState) -> StrategyTag {
        if !session.ever_flagged() {
            return StrategyTag::Stall;
        }
        if session.turn_count >= self.max_turns || session.distinct_kinds() >= self.target_kinds {
            return StrategyTag::Disengage;
        }
        if session.has_payment_artifact() {
            StrategyTag::Bait
        } else {
            StrategyTag::Probe
        }
    }
}
