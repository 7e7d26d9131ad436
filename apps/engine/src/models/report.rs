//! Session reports: the single, exactly-once-persisted record of a run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ai_guard::trace::AiGuardTrace;
use crate::models::draft::Draft;
use crate::models::listing::{Criteria, ListingId, ScoredListing};

/// What happened to one shortlisted listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ListingOutcome {
    /// Documents were synthesized and ran through AI-Guard.
    Generated { draft: Draft, trace: AiGuardTrace },
    /// A component failed for this listing; the run continued with the rest.
    Failed { error: String },
    /// The run was cancelled before this listing was processed.
    Skipped { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingReport {
    pub listing_id: ListingId,
    pub title: String,
    pub company: String,
    pub outcome: ListingOutcome,
}

/// Written once at run end and never mutated after persistence. Every field
/// round-trips losslessly through the report sink's serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub criteria: Criteria,
    pub search_term: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Distinct listings discovery accumulated before scoring.
    pub results_found: usize,
    /// Discovery found some listings but fewer than `min_results`.
    pub shortfall: bool,
    /// No listing met the compatibility threshold; the shortlist fell back to
    /// the top-N by score.
    pub fallback_shortlist: bool,
    pub scored: Vec<ScoredListing>,
    pub listings: Vec<ListingReport>,
    pub cancelled: bool,
}

impl SessionReport {
    pub fn generated_count(&self) -> usize {
        self.listings
            .iter()
            .filter(|l| matches!(l.outcome, ListingOutcome::Generated { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.listings
            .iter()
            .filter(|l| matches!(l.outcome, ListingOutcome::Failed { .. }))
            .count()
    }
}
