//! Search criteria, listings, and scored listings — the records flowing
//! through discovery and scoring.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sources::SourceKind;

/// What the user asked for. Immutable per search invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Criteria {
    pub role: String,
    pub function: String,
    pub country: String,
    pub source_preference: Option<SourceKind>,
}

impl Criteria {
    /// The query string actually sent to sources: role + function.
    pub fn search_term(&self) -> String {
        format!("{} {}", self.role, self.function).trim().to_string()
    }
}

/// Listing identity: unique within a source, globally unique with the source tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingId {
    pub source: SourceKind,
    pub external_id: String,
}

/// A single job posting fetched from a source. Immutable once fetched;
/// enrichment may attach a normalized description without changing identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub source: SourceKind,
    pub external_id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub posted_at: DateTime<Utc>,
    pub description: String,
    pub normalized_description: Option<String>,
}

impl Listing {
    pub fn id(&self) -> ListingId {
        ListingId {
            source: self.source,
            external_id: self.external_id.clone(),
        }
    }

    /// The text the scorer works from: the normalized description if attached,
    /// else the raw description with whitespace collapsed. If both are empty,
    /// a minimal signal is synthesized from title + company + location so
    /// scoring never degenerates to 0.0 across the board.
    pub fn signal_text(&self) -> String {
        let text = match &self.normalized_description {
            Some(n) if !n.trim().is_empty() => n.clone(),
            _ => normalize_whitespace(&self.description),
        };
        if !text.is_empty() {
            return text;
        }
        normalize_whitespace(&format!("{} {} {}", self.title, self.company, self.location))
    }

    /// Enrichment step: attach a normalized description. Identity is unchanged.
    pub fn with_normalized_description(mut self) -> Self {
        self.normalized_description = Some(normalize_whitespace(&self.description));
        self
    }
}

/// Collapse all whitespace runs to single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One scoring criterion's audit record: how much it overlapped and what it
/// contributed to the final score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionContribution {
    pub raw_overlap: f64,
    pub weight: f64,
    pub contribution: f64,
}

/// A listing with its compatibility score and per-criterion rationale.
/// Immutable after creation. The rationale keys are criterion names; a
/// `BTreeMap` keeps repeat scoring bit-identical.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredListing {
    pub listing: Listing,
    /// 0–10, one decimal.
    pub score: f64,
    pub rationale: BTreeMap<String, CriterionContribution>,
}
