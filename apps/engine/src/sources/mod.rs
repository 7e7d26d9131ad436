//! Job Source Gateway — the uniform `search` capability over pluggable
//! job-board adapters.
//!
//! Adapters are a fixed set of known implementations selected by
//! configuration and dispatched through one trait, never runtime reflection.
//! The scraping adapters themselves live outside this crate; the engine ships
//! only the trait, the selection enum, and a file-backed source for offline
//! runs and tests.

pub mod file;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::SourceError;
use crate::models::listing::Listing;

#[derive(Debug, Error)]
#[error("unknown job source '{0}'")]
pub struct UnknownSource(String);

/// The known job boards plus the offline file source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Indeed,
    Jobup,
    JobsCh,
    LinkedIn,
    File,
}

impl SourceKind {
    /// Coordinator's fixed priority order, used when neither the criteria nor
    /// the configuration states a preference.
    pub const DEFAULT_PRIORITY: [SourceKind; 4] = [
        SourceKind::Indeed,
        SourceKind::Jobup,
        SourceKind::JobsCh,
        SourceKind::LinkedIn,
    ];
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::Indeed => "indeed",
            SourceKind::Jobup => "jobup",
            SourceKind::JobsCh => "jobs_ch",
            SourceKind::LinkedIn => "linkedin",
            SourceKind::File => "file",
        };
        f.write_str(name)
    }
}

impl FromStr for SourceKind {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "indeed" => Ok(SourceKind::Indeed),
            "jobup" => Ok(SourceKind::Jobup),
            "jobs_ch" | "jobsch" | "jobs.ch" => Ok(SourceKind::JobsCh),
            "linkedin" => Ok(SourceKind::LinkedIn),
            "file" => Ok(SourceKind::File),
            other => Err(UnknownSource(other.to_string())),
        }
    }
}

/// One concrete query sent to a source. Discovery derives these from the
/// widening schedule; adapters that do not understand a field ignore it.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub term: String,
    pub location: String,
    /// Posted-within window in days.
    pub days: u32,
    pub limit: usize,
    pub country: String,
    /// Query the source's generic top-level domain instead of the
    /// country-local one (the schedule's last-resort widening step).
    pub generic_domain: bool,
}

/// The gateway capability. No internal state beyond per-call bookkeeping;
/// retry and backoff belong to the discovery coordinator.
#[async_trait]
pub trait JobSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Listing>, SourceError>;
}

/// Configured adapters, keyed by kind. The coordinator resolves each widening
/// variant's source here; unregistered kinds are skipped as unavailable.
#[derive(Default, Clone)]
pub struct SourceRegistry {
    sources: HashMap<SourceKind, Arc<dyn JobSource>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, source: Arc<dyn JobSource>) {
        self.sources.insert(source.kind(), source);
    }

    pub fn get(&self, kind: SourceKind) -> Option<Arc<dyn JobSource>> {
        self.sources.get(&kind).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_parses_common_spellings() {
        assert_eq!("indeed".parse::<SourceKind>().unwrap(), SourceKind::Indeed);
        assert_eq!("jobs.ch".parse::<SourceKind>().unwrap(), SourceKind::JobsCh);
        assert_eq!("JOBUP".parse::<SourceKind>().unwrap(), SourceKind::Jobup);
    }

    #[test]
    fn test_unknown_source_error_names_the_input() {
        let err = "monster".parse::<SourceKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown job source 'monster'");
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for kind in [
            SourceKind::Indeed,
            SourceKind::Jobup,
            SourceKind::JobsCh,
            SourceKind::LinkedIn,
            SourceKind::File,
        ] {
            assert_eq!(kind.to_string().parse::<SourceKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_registry_resolves_registered_kinds_only() {
        let registry = SourceRegistry::new();
        assert!(registry.get(SourceKind::Indeed).is_none());
        assert!(registry.is_empty());
    }
}
