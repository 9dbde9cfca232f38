//! Scam detection
//!
//! Model-first classification with a deterministic rule fallback. The
//! detector itself never fails: a model fault degrades to the rule score,
//! and when both paths produce signal the higher confidence wins.

pub mod rules;

pub use rules::{RuleScore, RuleScorer};

use crate::model::ModelClient;
use crate::session::{DetectionVerdict, Message, VerdictSource};
use std::sync::Arc;

/// Per-message scam classifier.
pub struct ScamDetector {
    model: Arc<dyn ModelClient>,
    rules: RuleScorer,
    threshold: f64,
}

impl ScamDetector {
    pub fn new(model: Arc<dyn ModelClient>, rules: RuleScorer, threshold: f64) -> Self {
        Self {
            model,
            rules,
            threshold,
        }
    }

    /// Classify one inbound message in the context of prior history.
    ///
    /// Always produces a verdict. The model path is tried first; on failure
    /// the rule score stands alone. When the model succeeds and rules also
    /// fired, the verdict takes the higher of the two confidences.
    pub async fn detect(&self, text: &str, history: &[Message]) -> DetectionVerdict {
        let rule = self.rules.score(text, history);

        match self.model.classify(text, history).await {
            Ok(model_verdict) => {
                tracing::debug!(
                    model_confidence = model_verdict.confidence,
                    rule_score = rule.score,
                    "classification complete"
                );
                if rule.score > 0.0 {
                    // Fuse: whichever path is more confident decides
                    let (confidence, rationale) = if rule.score > model_verdict.confidence {
                        (rule.score, format!("rules: {}", rule.evidence.join("; ")))
                    } else {
                        (model_verdict.confidence, model_verdict.reason)
                    };
                    DetectionVerdict {
                        is_scam: confidence >= self.threshold,
                        confidence,
                        source: VerdictSource::Fused,
                        rationale,
                    }
                } else {
                    // The threshold alone decides; the model's own boolean
                    // is advisory
                    DetectionVerdict {
                        is_scam: model_verdict.confidence >= self.threshold,
                        confidence: model_verdict.confidence,
                        source: VerdictSource::Model,
                        rationale: model_verdict.reason,
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "model classification failed, using rule score");
                DetectionVerdict {
                    is_scam: rule.score >= self.threshold,
                    confidence: rule.score,
                    source: VerdictSource::Rule,
                    rationale: if rule.evidence.is_empty() {
                        "no indicators matched".to_string()
                    } else {
                        format!("rules: {}", rule.evidence.join("; "))
                    },
                }
            }
        }
    }
}
