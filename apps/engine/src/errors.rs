use thiserror::Error;

/// Failure modes of a single gateway call against a job source.
///
/// Everything except `InvalidCriteria` is transient: the discovery
/// coordinator retries it with backoff before moving to the next
/// widening-schedule variant.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source request timed out")]
    Timeout,

    #[error("source rate-limited the request")]
    RateLimited,

    #[error("invalid search criteria: {0}")]
    InvalidCriteria(String),

    #[error("source unavailable: {0}")]
    Unavailable(String),
}

impl SourceError {
    pub fn is_transient(&self) -> bool {
        !matches!(self, SourceError::InvalidCriteria(_))
    }
}

/// Discovery-level outcomes that abort the run.
///
/// A shortfall (some listings, fewer than requested) is NOT an error — it is
/// reported through `DiscoveryOutcome::shortfall`.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("no listings found after exhausting the widening schedule")]
    NoListingsFound,

    #[error("invalid search criteria: {0}")]
    InvalidCriteria(String),
}

/// Failure modes of the external text oracles (generation, detection, rewrite).
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    #[error("oracle timed out")]
    Timeout,
}

/// Failure modes of document synthesis for a single listing.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("malformed generation: missing sections {missing:?}, unexpected sections {unexpected:?}")]
    MalformedGeneration {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// Top-level error type for a session run.
///
/// Per-listing and per-section failures never surface here — they are
/// recorded in the report and the run continues. Only discovery-level fatal
/// errors and infrastructure failures (persistence) abort a run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_and_rate_limit_are_transient() {
        assert!(SourceError::Timeout.is_transient());
        assert!(SourceError::RateLimited.is_transient());
        assert!(SourceError::Unavailable("503".to_string()).is_transient());
    }

    #[test]
    fn test_invalid_criteria_is_fatal() {
        assert!(!SourceError::InvalidCriteria("empty role".to_string()).is_transient());
    }

    #[test]
    fn test_malformed_generation_names_both_sets() {
        let err = SynthesisError::MalformedGeneration {
            missing: vec!["cover-letter-body".to_string()],
            unexpected: vec!["footer".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("cover-letter-body"));
        assert!(msg.contains("footer"));
    }
}
