//! Session orchestration: one `run` drives discovery, scoring, shortlisting,
//! synthesis, and AI-Guard end to end, then persists exactly one report.
//!
//! Failure isolation is per listing — a listing that fails synthesis is
//! recorded and the run moves on. Only discovery-level failures (invalid
//! criteria, nothing found at all) abort the session.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::ai_guard::{self, DetectorOracle, GuardSettings, RewriteOracle};
use crate::config::EngineConfig;
use crate::discovery::DiscoveryCoordinator;
use crate::errors::EngineError;
use crate::memory::{MemoryStore, OutcomeRecord};
use crate::models::listing::Criteria;
use crate::models::profile::Profile;
use crate::models::report::{ListingOutcome, ListingReport, SessionReport};
use crate::report_sink::ReportSink;
use crate::scoring;
use crate::synthesis::{self, GenerationOracle};

/// Raises the shared cancellation flag. Held by whoever owns the run
/// (typically the ctrl-c handler).
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    pub fn cancel(&self) {
        // receivers may already be gone at shutdown
        let _ = self.0.send(true);
    }
}

/// Cheaply cloneable view of the cancellation flag, checked at stage
/// boundaries. Cancellation is cooperative: in-flight oracle calls finish.
#[derive(Clone)]
pub struct CancelToken(watch::Receiver<bool>);

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }
}

pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle(tx), CancelToken(rx))
}

/// Owns every pipeline component for the lifetime of a session.
pub struct SessionRunner {
    pub discovery: DiscoveryCoordinator,
    pub generator: Arc<dyn GenerationOracle>,
    pub detector: Arc<dyn DetectorOracle>,
    pub rewriter: Arc<dyn RewriteOracle>,
    pub memory: Arc<dyn MemoryStore>,
    pub reports: Arc<dyn ReportSink>,
    pub config: EngineConfig,
}

impl SessionRunner {
    pub async fn run(
        &self,
        criteria: Criteria,
        profile: Profile,
        cancel: CancelToken,
    ) -> Result<SessionReport, EngineError> {
        let session_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%session_id, term = %criteria.search_term(), "session started");

        // memory snapshot failure is not worth aborting a run over
        let profile = match self.memory.snapshot().await {
            Ok(entries) => profile.with_memory(entries),
            Err(err) => {
                warn!(error = %err, "memory snapshot failed, running without stored entries");
                profile
            }
        };

        let discovered = self
            .discovery
            .discover(
                &criteria,
                self.config.min_results,
                self.config.max_discovery_attempts,
                &cancel,
            )
            .await?;
        let results_found = discovered.listings.len();

        let scored: Vec<_> = discovered
            .listings
            .iter()
            .map(|listing| scoring::score(listing, &profile))
            .collect();

        let shortlist = scoring::shortlist(
            scored.clone(),
            self.config.compatibility_threshold,
            self.config.max_docs,
            &self.config.source_priority,
        );
        if shortlist.fallback {
            warn!(
                threshold = self.config.compatibility_threshold,
                "no listing met the threshold, falling back to top scores"
            );
        }
        info!(
            found = results_found,
            shortlisted = shortlist.entries.len(),
            "shortlist ready"
        );

        let guard_settings = GuardSettings {
            target_score: self.config.ai_target_score,
            max_iters: self.config.ai_max_iters,
            fact_floor: self.config.fact_similarity_floor,
            fan_out: self.config.section_fan_out,
        };

        let mut listing_reports: Vec<ListingReport> = Vec::with_capacity(shortlist.entries.len());
        for entry in &shortlist.entries {
            let listing = &entry.listing;

            if cancel.is_cancelled() {
                listing_reports.push(ListingReport {
                    listing_id: listing.id(),
                    title: listing.title.clone(),
                    company: listing.company.clone(),
                    outcome: ListingOutcome::Skipped {
                        reason: "session cancelled".to_string(),
                    },
                });
                continue;
            }

            let draft = match synthesis::synthesize(listing, &profile, self.generator.as_ref())
                .await
            {
                Ok(draft) => draft,
                Err(err) => {
                    error!(
                        title = %listing.title,
                        company = %listing.company,
                        error = %err,
                        "synthesis failed, continuing with remaining listings"
                    );
                    listing_reports.push(ListingReport {
                        listing_id: listing.id(),
                        title: listing.title.clone(),
                        company: listing.company.clone(),
                        outcome: ListingOutcome::Failed {
                            error: err.to_string(),
                        },
                    });
                    continue;
                }
            };

            let (draft, trace) = ai_guard::optimize(
                draft,
                &guard_settings,
                Arc::clone(&self.detector),
                Arc::clone(&self.rewriter),
                cancel.clone(),
            )
            .await;

            listing_reports.push(ListingReport {
                listing_id: listing.id(),
                title: listing.title.clone(),
                company: listing.company.clone(),
                outcome: ListingOutcome::Generated { draft, trace },
            });
        }

        let report = SessionReport {
            session_id,
            search_term: criteria.search_term(),
            criteria,
            started_at,
            finished_at: Utc::now(),
            results_found,
            shortfall: discovered.shortfall,
            fallback_shortlist: shortlist.fallback,
            scored,
            listings: listing_reports,
            cancelled: cancel.is_cancelled(),
        };

        let path = self.reports.persist(&report).await?;
        info!(
            %session_id,
            generated = report.generated_count(),
            failed = report.failed_count(),
            report = %path.display(),
            "session finished"
        );

        // outcome bookkeeping failure must not fail an otherwise good run
        let outcome = OutcomeRecord {
            session_id,
            date: report.finished_at,
            topic: "session".to_string(),
            description: format!(
                "{} drafts generated, {} failed, {} listings found for '{}'",
                report.generated_count(),
                report.failed_count(),
                report.results_found,
                report.search_term
            ),
            notes: if report.cancelled {
                "cancelled".to_string()
            } else {
                String::new()
            },
        };
        if let Err(err) = self.memory.append_outcome(outcome).await {
            warn!(error = %err, "failed to append session outcome");
        }

        Ok(report)
    }
}
