//! Append-only audit trail of the AI-likeness reduction loop.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// What happened at one step of a section's optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceAction {
    /// The detector scored the section's current text.
    Score,
    /// A rewrite candidate passed the factual-similarity floor and became the
    /// section's working text.
    Rewrite,
    /// Both rewrite attempts fell below the factual-similarity floor; the
    /// previous text was kept and the iteration recorded as a no-op.
    RewriteRejected,
}

/// One trace record. `score` is present for `Score` entries only; the hash
/// always reflects the section text resulting from the step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub iteration: u32,
    pub action: TraceAction,
    pub score: Option<f64>,
    pub text_hash: String,
}

/// Why a section's optimization ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionExit {
    /// Detector score reached the target.
    TargetMet,
    /// Iteration budget ran out; the best-scoring text seen was retained.
    BudgetExhausted,
    /// Every attempted rewrite was rejected for fact drift through the whole
    /// budget; the original text was retained.
    FactDriftRejected,
    /// A detector or rewrite oracle became unavailable; the last good text
    /// was retained.
    OracleFailure,
    /// The run was cancelled before or during this section's loop.
    Cancelled,
}

/// Full optimization record for one section. Immutable once the section's
/// run ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionTrace {
    pub section: String,
    pub entries: Vec<TraceEntry>,
    pub exit: SectionExit,
    /// Detector score of the retained text, when at least one scoring pass ran.
    pub final_score: Option<f64>,
}

impl SectionTrace {
    /// Iterations actually attempted (the baseline scoring pass is iteration 0).
    pub fn iterations(&self) -> u32 {
        self.entries.iter().map(|e| e.iteration).max().unwrap_or(0)
    }

    pub fn count(&self, action: TraceAction) -> usize {
        self.entries.iter().filter(|e| e.action == action).count()
    }
}

/// Per-section traces in draft section order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiGuardTrace {
    pub sections: Vec<SectionTrace>,
}

impl AiGuardTrace {
    pub fn section(&self, name: &str) -> Option<&SectionTrace> {
        self.sections.iter().find(|s| s.section == name)
    }
}

/// SHA-256 of the section text, hex-encoded. Lets an auditor tie every trace
/// entry back to the exact text it scored without storing the text itself.
pub fn text_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_hash_is_stable_and_distinguishes_texts() {
        assert_eq!(text_hash("abc"), text_hash("abc"));
        assert_ne!(text_hash("abc"), text_hash("abd"));
        assert_eq!(text_hash("abc").len(), 64);
    }

    #[test]
    fn test_iterations_is_max_entry_index() {
        let trace = SectionTrace {
            section: "summary".to_string(),
            entries: vec![
                TraceEntry {
                    iteration: 0,
                    action: TraceAction::Score,
                    score: Some(70.0),
                    text_hash: text_hash("a"),
                },
                TraceEntry {
                    iteration: 1,
                    action: TraceAction::Rewrite,
                    score: None,
                    text_hash: text_hash("b"),
                },
                TraceEntry {
                    iteration: 1,
                    action: TraceAction::Score,
                    score: Some(50.0),
                    text_hash: text_hash("b"),
                },
            ],
            exit: SectionExit::BudgetExhausted,
            final_score: Some(50.0),
        };
        assert_eq!(trace.iterations(), 1);
        assert_eq!(trace.count(TraceAction::Score), 2);
        assert_eq!(trace.count(TraceAction::Rewrite), 1);
    }

    #[test]
    fn test_trace_round_trips_through_json() {
        let trace = AiGuardTrace {
            sections: vec![SectionTrace {
                section: "summary".to_string(),
                entries: vec![TraceEntry {
                    iteration: 0,
                    action: TraceAction::Score,
                    score: Some(42.5),
                    text_hash: text_hash("x"),
                }],
                exit: SectionExit::TargetMet,
                final_score: Some(42.5),
            }],
        };
        let json = serde_json::to_string(&trace).unwrap();
        let back: AiGuardTrace = serde_json::from_str(&json).unwrap();
        assert_eq!(back, trace);
    }
}
