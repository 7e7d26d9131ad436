//! AI-Guard — iterative AI-likeness reduction over a draft's sections.
//!
//! Each section runs the same loop: score the text, ask the rewrite oracle
//! for a more human-sounding version, reject the rewrite if it drops facts,
//! re-score, and keep the best text seen. The loop stops on target, budget,
//! fact-drift lockout, oracle failure, or cancellation — and it always
//! returns usable text, never a worse one than it started with.
//!
//! Sections are independent, so they run concurrently under a semaphore;
//! results are applied back to the draft in section order so the output is
//! deterministic regardless of task scheduling.

pub mod evaluator;
pub mod humanize;
pub mod similarity;
pub mod trace;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::errors::OracleError;
use crate::models::draft::{Draft, SectionCategory};
use crate::session::CancelToken;
use similarity::factual_similarity;
use trace::{text_hash, AiGuardTrace, SectionExit, SectionTrace, TraceAction, TraceEntry};

/// Scores text for AI-likeness in [0, 100]; lower is more human.
#[async_trait]
pub trait DetectorOracle: Send + Sync {
    async fn detect(&self, text: &str) -> Result<f64, OracleError>;
}

/// Guidance passed to the rewrite oracle alongside the text.
#[derive(Debug, Clone, Copy)]
pub struct RewriteHints {
    pub category: SectionCategory,
    /// Set on the retry after a fact-drift rejection: the rewrite must keep
    /// every fact verbatim even at the cost of a smaller style change.
    pub preserve_facts: bool,
}

/// Produces a more human-sounding rendition of the text.
#[async_trait]
pub trait RewriteOracle: Send + Sync {
    async fn rewrite(
        &self,
        text: &str,
        target: f64,
        hints: &RewriteHints,
    ) -> Result<String, OracleError>;
}

#[derive(Debug, Clone)]
pub struct GuardSettings {
    /// Stop as soon as a section scores at or below this.
    pub target_score: f64,
    /// Rewrite iterations per section after the baseline scoring.
    pub max_iters: u32,
    /// Minimum factual similarity a rewrite must keep to be accepted.
    pub fact_floor: f64,
    /// How many sections may run their loops concurrently.
    pub fan_out: usize,
}

impl Default for GuardSettings {
    fn default() -> Self {
        Self {
            target_score: 35.0,
            max_iters: 3,
            fact_floor: 0.55,
            fan_out: 4,
        }
    }
}

struct SectionOutcome {
    final_text: String,
    changed: bool,
    trace: SectionTrace,
}

/// Run the guard loop over one section's text.
async fn optimize_section(
    name: String,
    category: SectionCategory,
    original: String,
    settings: GuardSettings,
    detector: Arc<dyn DetectorOracle>,
    rewriter: Arc<dyn RewriteOracle>,
    cancel: CancelToken,
) -> SectionOutcome {
    let mut entries: Vec<TraceEntry> = Vec::new();

    let baseline = match detector.detect(&original).await {
        Ok(score) => score,
        Err(err) => {
            warn!(section = %name, error = %err, "detector failed on baseline, section left as-is");
            return SectionOutcome {
                final_text: original.clone(),
                changed: false,
                trace: SectionTrace {
                    section: name,
                    entries,
                    exit: SectionExit::OracleFailure,
                    final_score: None,
                },
            };
        }
    };
    entries.push(TraceEntry {
        iteration: 0,
        action: TraceAction::Score,
        score: Some(baseline),
        text_hash: text_hash(&original),
    });

    let mut best_text = original.clone();
    let mut best_score = baseline;

    if baseline <= settings.target_score {
        debug!(section = %name, score = baseline, "baseline already under target");
        return SectionOutcome {
            final_text: best_text,
            changed: false,
            trace: SectionTrace {
                section: name,
                entries,
                exit: SectionExit::TargetMet,
                final_score: Some(baseline),
            },
        };
    }

    let mut any_accepted = false;

    for iteration in 1..=settings.max_iters {
        if cancel.is_cancelled() {
            info!(section = %name, iteration, "cancelled mid-loop, keeping best text so far");
            return SectionOutcome {
                changed: best_text != original,
                final_text: best_text,
                trace: SectionTrace {
                    section: name,
                    entries,
                    exit: SectionExit::Cancelled,
                    final_score: Some(best_score),
                },
            };
        }

        let hints = RewriteHints {
            category,
            preserve_facts: false,
        };
        let candidate = match rewriter
            .rewrite(&best_text, settings.target_score, &hints)
            .await
        {
            Ok(text) => text,
            Err(err) => {
                warn!(section = %name, iteration, error = %err, "rewrite oracle failed");
                return SectionOutcome {
                    changed: best_text != original,
                    final_text: best_text,
                    trace: SectionTrace {
                        section: name,
                        entries,
                        exit: SectionExit::OracleFailure,
                        final_score: Some(best_score),
                    },
                };
            }
        };

        // the floor is anchored to the synthesized text so drift cannot
        // accumulate across accepted rewrites
        let candidate = if factual_similarity(&original, &candidate) < settings.fact_floor {
            // one strict retry before the iteration is written off
            let strict = RewriteHints {
                category,
                preserve_facts: true,
            };
            let retry = match rewriter
                .rewrite(&best_text, settings.target_score, &strict)
                .await
            {
                Ok(text) => text,
                Err(err) => {
                    warn!(section = %name, iteration, error = %err, "strict rewrite failed");
                    return SectionOutcome {
                        changed: best_text != original,
                        final_text: best_text,
                        trace: SectionTrace {
                            section: name,
                            entries,
                            exit: SectionExit::OracleFailure,
                            final_score: Some(best_score),
                        },
                    };
                }
            };
            if factual_similarity(&original, &retry) < settings.fact_floor {
                warn!(section = %name, iteration, "rewrite dropped facts twice, iteration rejected");
                entries.push(TraceEntry {
                    iteration,
                    action: TraceAction::RewriteRejected,
                    score: None,
                    text_hash: text_hash(&best_text),
                });
                continue;
            }
            retry
        } else {
            candidate
        };

        any_accepted = true;
        entries.push(TraceEntry {
            iteration,
            action: TraceAction::Rewrite,
            score: None,
            text_hash: text_hash(&candidate),
        });

        let score = match detector.detect(&candidate).await {
            Ok(score) => score,
            Err(err) => {
                warn!(section = %name, iteration, error = %err, "detector failed mid-loop");
                return SectionOutcome {
                    changed: best_text != original,
                    final_text: best_text,
                    trace: SectionTrace {
                        section: name,
                        entries,
                        exit: SectionExit::OracleFailure,
                        final_score: Some(best_score),
                    },
                };
            }
        };
        entries.push(TraceEntry {
            iteration,
            action: TraceAction::Score,
            score: Some(score),
            text_hash: text_hash(&candidate),
        });
        debug!(section = %name, iteration, score, best = best_score, "iteration scored");

        if score < best_score {
            best_score = score;
            best_text = candidate;
        }

        if best_score <= settings.target_score {
            info!(section = %name, iteration, score = best_score, "target met");
            return SectionOutcome {
                changed: best_text != original,
                final_text: best_text,
                trace: SectionTrace {
                    section: name,
                    entries,
                    exit: SectionExit::TargetMet,
                    final_score: Some(best_score),
                },
            };
        }
    }

    if !any_accepted {
        // every iteration was a fact-drift rejection, keep the untouched text
        warn!(section = %name, "all rewrites rejected for fact drift");
        return SectionOutcome {
            final_text: original,
            changed: false,
            trace: SectionTrace {
                section: name,
                entries,
                exit: SectionExit::FactDriftRejected,
                final_score: Some(baseline),
            },
        };
    }

    info!(section = %name, score = best_score, "budget exhausted, keeping best text");
    SectionOutcome {
        changed: best_text != original,
        final_text: best_text,
        trace: SectionTrace {
            section: name,
            entries,
            exit: SectionExit::BudgetExhausted,
            final_score: Some(best_score),
        },
    }
}

/// Optimize every section of the draft. Returns the (possibly rewritten)
/// draft together with the full per-section trace.
pub async fn optimize(
    mut draft: Draft,
    settings: &GuardSettings,
    detector: Arc<dyn DetectorOracle>,
    rewriter: Arc<dyn RewriteOracle>,
    cancel: CancelToken,
) -> (Draft, AiGuardTrace) {
    let semaphore = Arc::new(Semaphore::new(settings.fan_out.max(1)));
    let mut handles = Vec::with_capacity(draft.sections.len());

    for (idx, section) in draft.sections.iter().enumerate() {
        let name = section.name.clone();
        let category = section.category;
        let text = section.text.clone();
        let settings = settings.clone();
        let detector = Arc::clone(&detector);
        let rewriter = Arc::clone(&rewriter);
        let cancel = cancel.clone();
        let semaphore = Arc::clone(&semaphore);

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            let outcome =
                optimize_section(name, category, text, settings, detector, rewriter, cancel).await;
            (idx, outcome)
        }));
    }

    // handles are in spawn order, which is section order
    let mut outcomes: Vec<(usize, SectionOutcome)> = Vec::with_capacity(handles.len());
    for (idx, handle) in handles.into_iter().enumerate() {
        match handle.await {
            Ok(pair) => outcomes.push(pair),
            Err(err) => {
                // a panicked task still gets a terminal trace so the report
                // accounts for every section
                let section = &draft.sections[idx];
                warn!(section = %section.name, error = %err, "guard section task panicked, section left as-is");
                outcomes.push((
                    idx,
                    SectionOutcome {
                        final_text: section.text.clone(),
                        changed: false,
                        trace: SectionTrace {
                            section: section.name.clone(),
                            entries: Vec::new(),
                            exit: SectionExit::OracleFailure,
                            final_score: None,
                        },
                    },
                ));
            }
        }
    }
    // apply in section order so revision numbering is stable
    outcomes.sort_by_key(|(idx, _)| *idx);

    let mut trace = AiGuardTrace::default();
    for (idx, outcome) in outcomes {
        if outcome.changed {
            let name = draft.sections[idx].name.clone();
            draft.replace_section_text(&name, outcome.final_text);
        }
        trace.sections.push(outcome.trace);
    }

    (draft, trace)
}
