//! Source Discovery Coordinator — drives the gateway through the widening
//! schedule until enough distinct listings are found or the attempt budget
//! is exhausted.

pub mod widening;

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::errors::{DiscoveryError, SourceError};
use crate::models::listing::{Criteria, Listing, ListingId};
use crate::session::CancelToken;
use crate::sources::{SourceKind, SourceRegistry};

use self::widening::{build_schedule, QueryVariant, WideningConfig};

/// Retries per gateway call on a transient failure, after the initial attempt.
const MAX_TRANSIENT_RETRIES: u32 = 3;

#[derive(Debug)]
pub struct DiscoveryOutcome {
    /// Deduplicated by listing identity, first-seen order preserved.
    pub listings: Vec<Listing>,
    /// Fewer than `min_results` were found.
    pub shortfall: bool,
    pub variants_tried: usize,
}

pub struct DiscoveryCoordinator {
    registry: SourceRegistry,
    priority: Vec<SourceKind>,
    widening: WideningConfig,
}

impl DiscoveryCoordinator {
    pub fn new(
        registry: SourceRegistry,
        priority: Vec<SourceKind>,
        widening: WideningConfig,
    ) -> Self {
        Self {
            registry,
            priority,
            widening,
        }
    }

    /// Walk the widening schedule in priority order, accumulating distinct
    /// listings until `min_results` are found or `max_attempts` variants have
    /// been tried. Transient gateway failures are retried with backoff, then
    /// treated as a failure of that variant only; `InvalidCriteria` aborts
    /// discovery as a whole. Cancellation stops the walk and returns whatever
    /// was accumulated so far, possibly nothing.
    pub async fn discover(
        &self,
        criteria: &Criteria,
        min_results: usize,
        max_attempts: usize,
        cancel: &CancelToken,
    ) -> Result<DiscoveryOutcome, DiscoveryError> {
        let schedule = build_schedule(criteria, &self.priority, &self.widening);
        info!(
            term = %criteria.search_term(),
            location = %criteria.country,
            variants = schedule.len().min(max_attempts),
            "starting discovery"
        );

        let mut seen: HashSet<ListingId> = HashSet::new();
        let mut listings: Vec<Listing> = Vec::new();
        let mut variants_tried = 0usize;
        let mut cancelled = false;

        for variant in schedule.iter().take(max_attempts) {
            if cancel.is_cancelled() {
                info!("discovery cancelled after {variants_tried} variants");
                cancelled = true;
                break;
            }

            let Some(source) = self.registry.get(variant.source) else {
                debug!(source = %variant.source, "source not registered, skipping variant");
                continue;
            };

            variants_tried += 1;
            match self.search_with_retry(source.as_ref(), variant).await {
                Ok(batch) => {
                    let mut fresh = 0usize;
                    for listing in batch {
                        if seen.insert(listing.id()) {
                            listings.push(listing.with_normalized_description());
                            fresh += 1;
                        }
                    }
                    info!(
                        variant = %variant.label,
                        fresh,
                        total = listings.len(),
                        "variant complete"
                    );
                }
                Err(SourceError::InvalidCriteria(msg)) => {
                    return Err(DiscoveryError::InvalidCriteria(msg));
                }
                Err(e) => {
                    warn!(variant = %variant.label, error = %e, "variant failed, widening");
                }
            }

            if listings.len() >= min_results {
                break;
            }
        }

        // a cancelled walk hands back whatever it has, even nothing, so the
        // caller can still write its report; only an uncancelled walk that
        // found nothing is an error
        if listings.is_empty() && !cancelled {
            return Err(DiscoveryError::NoListingsFound);
        }

        let shortfall = listings.len() < min_results;
        if shortfall {
            warn!(
                found = listings.len(),
                min_results, "discovery finished with a shortfall"
            );
        }
        Ok(DiscoveryOutcome {
            listings,
            shortfall,
            variants_tried,
        })
    }

    /// One gateway call with the transient-retry ladder: initial attempt plus
    /// up to `MAX_TRANSIENT_RETRIES` retries, backing off 1s, 2s, 4s.
    async fn search_with_retry(
        &self,
        source: &dyn crate::sources::JobSource,
        variant: &QueryVariant,
    ) -> Result<Vec<Listing>, SourceError> {
        let mut last_error = SourceError::Unavailable("no attempt made".to_string());

        for attempt in 0..=MAX_TRANSIENT_RETRIES {
            if attempt > 0 {
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    variant = %variant.label,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "transient source failure, backing off"
                );
                tokio::time::sleep(delay).await;
            }

            match source.search(&variant.query).await {
                Ok(batch) => return Ok(batch),
                Err(e) if e.is_transient() => {
                    last_error = e;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error)
    }
}
