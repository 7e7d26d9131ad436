//! The widening schedule: an ordered set of query-relaxation variants tried
//! in sequence during discovery.
//!
//! The exact steps are product tuning, so they live in configuration, not
//! code: date windows widen first, then location aliases are swept, then the
//! source's generic top-level domain is tried, then the next source in
//! priority order starts over.

use serde::{Deserialize, Serialize};

use crate::models::listing::Criteria;
use crate::sources::{SearchQuery, SourceKind};

/// Max listings requested per gateway call.
pub const SEARCH_LIMIT: usize = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WideningConfig {
    /// Posted-within window for the first variant, in days.
    pub base_days: u32,
    /// Widened windows tried in order after the base window comes up short.
    pub widened_days: Vec<u32>,
    /// Alternate locations (nearby cities, canton names) swept after the date
    /// windows.
    pub location_aliases: Vec<String>,
    /// Whether to finish each source's ladder with a generic-domain variant.
    pub generic_domain_fallback: bool,
}

impl Default for WideningConfig {
    fn default() -> Self {
        Self {
            base_days: 7,
            widened_days: vec![14, 30],
            location_aliases: Vec::new(),
            generic_domain_fallback: true,
        }
    }
}

/// One rung of the escalation ladder: a concrete query against one source.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryVariant {
    pub source: SourceKind,
    pub query: SearchQuery,
    /// Human-readable rung name for logs.
    pub label: String,
}

/// Resolve which sources to try, in order: explicit criteria preference
/// first, then the configured priority list (deduplicated).
pub fn source_order(criteria: &Criteria, priority: &[SourceKind]) -> Vec<SourceKind> {
    let mut order = Vec::new();
    if let Some(preferred) = criteria.source_preference {
        order.push(preferred);
    }
    for kind in priority {
        if !order.contains(kind) {
            order.push(*kind);
        }
    }
    order
}

/// Expand criteria into the full variant ladder across all sources.
pub fn build_schedule(
    criteria: &Criteria,
    priority: &[SourceKind],
    config: &WideningConfig,
) -> Vec<QueryVariant> {
    let term = criteria.search_term();
    let mut variants = Vec::new();

    for source in source_order(criteria, priority) {
        let base = |location: &str, days: u32, generic: bool| SearchQuery {
            term: term.clone(),
            location: location.to_string(),
            days,
            limit: SEARCH_LIMIT,
            country: criteria.country.clone(),
            generic_domain: generic,
        };

        variants.push(QueryVariant {
            source,
            query: base(&criteria.country, config.base_days, false),
            label: format!("{source}:base({}d)", config.base_days),
        });
        for days in &config.widened_days {
            variants.push(QueryVariant {
                source,
                query: base(&criteria.country, *days, false),
                label: format!("{source}:widened({days}d)"),
            });
        }
        for alias in &config.location_aliases {
            variants.push(QueryVariant {
                source,
                query: base(alias, config.base_days, false),
                label: format!("{source}:alias({alias})"),
            });
        }
        if config.generic_domain_fallback {
            variants.push(QueryVariant {
                source,
                query: base(&criteria.country, config.base_days, true),
                label: format!("{source}:generic-domain"),
            });
        }
    }

    variants
}
