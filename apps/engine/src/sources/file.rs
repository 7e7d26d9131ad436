//! File-backed job source: serves listings from a JSON fixture on disk.
//!
//! Used for offline runs of the engine binary and as the deterministic
//! adapter in tests. Filtering mirrors what the real boards do with the same
//! query fields: term tokens against title + description, location substring,
//! posted-within-days window.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::debug;

use crate::errors::SourceError;
use crate::models::listing::Listing;
use crate::sources::{JobSource, SearchQuery, SourceKind};

pub struct FileSource {
    kind: SourceKind,
    path: PathBuf,
}

impl FileSource {
    pub fn new(kind: SourceKind, path: PathBuf) -> Self {
        Self { kind, path }
    }

    async fn load(&self) -> Result<Vec<Listing>, SourceError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| SourceError::Unavailable(format!("{}: {e}", self.path.display())))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| SourceError::Unavailable(format!("fixture parse error: {e}")))
    }
}

#[async_trait]
impl JobSource for FileSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Listing>, SourceError> {
        if query.term.trim().is_empty() {
            return Err(SourceError::InvalidCriteria(
                "empty search term".to_string(),
            ));
        }

        let listings = self.load().await?;
        let term_tokens: Vec<String> = query
            .term
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let location = query.location.to_lowercase();
        let cutoff = Utc::now() - Duration::days(i64::from(query.days));

        let mut hits: Vec<Listing> = listings
            .into_iter()
            .filter(|l| {
                let haystack = format!("{} {}", l.title, l.description).to_lowercase();
                term_tokens.iter().any(|t| haystack.contains(t))
            })
            .filter(|l| {
                // generic-domain widening drops the location constraint
                query.generic_domain
                    || location.is_empty()
                    || l.location.to_lowercase().contains(&location)
            })
            .filter(|l| l.posted_at >= cutoff)
            .collect();
        hits.truncate(query.limit);

        debug!(
            source = %self.kind,
            term = %query.term,
            hits = hits.len(),
            "file source search"
        );
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::io::Write;

    fn fixture_listing(id: &str, title: &str, location: &str, days_ago: i64) -> Listing {
        Listing {
            source: SourceKind::File,
            external_id: id.to_string(),
            title: title.to_string(),
            company: "Acme".to_string(),
            location: location.to_string(),
            posted_at: Utc::now() - Duration::days(days_ago),
            description: format!("{title} role building pipelines"),
            normalized_description: None,
        }
    }

    fn write_fixture(listings: &[Listing]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(serde_json::to_vec(listings).unwrap().as_slice())
            .unwrap();
        f
    }

    fn query(term: &str, location: &str, days: u32) -> SearchQuery {
        SearchQuery {
            term: term.to_string(),
            location: location.to_string(),
            days,
            limit: 30,
            country: "CH".to_string(),
            generic_domain: false,
        }
    }

    #[tokio::test]
    async fn test_filters_by_term_location_and_window() {
        let fixture = write_fixture(&[
            fixture_listing("a", "Data Engineer", "Zurich", 2),
            fixture_listing("b", "Data Engineer", "Berlin", 2),
            fixture_listing("c", "Data Engineer", "Zurich", 20),
            fixture_listing("d", "Florist", "Zurich", 1),
        ]);
        let source = FileSource::new(SourceKind::File, fixture.path().to_path_buf());

        let hits = source.search(&query("data engineer", "zurich", 7)).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].external_id, "a");
    }

    #[tokio::test]
    async fn test_widened_window_recovers_old_posting() {
        let fixture = write_fixture(&[fixture_listing("c", "Data Engineer", "Zurich", 20)]);
        let source = FileSource::new(SourceKind::File, fixture.path().to_path_buf());

        assert!(source
            .search(&query("data", "zurich", 7))
            .await
            .unwrap()
            .is_empty());
        let widened = source.search(&query("data", "zurich", 30)).await.unwrap();
        assert_eq!(widened.len(), 1);
    }

    #[tokio::test]
    async fn test_generic_domain_ignores_location() {
        let fixture = write_fixture(&[fixture_listing("b", "Data Engineer", "Berlin", 2)]);
        let source = FileSource::new(SourceKind::File, fixture.path().to_path_buf());

        let mut q = query("data", "zurich", 7);
        q.generic_domain = true;
        assert_eq!(source.search(&q).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_term_is_invalid_criteria() {
        let fixture = write_fixture(&[]);
        let source = FileSource::new(SourceKind::File, fixture.path().to_path_buf());
        let err = source.search(&query("  ", "zurich", 7)).await.unwrap_err();
        assert!(matches!(err, SourceError::InvalidCriteria(_)));
    }

    #[tokio::test]
    async fn test_missing_fixture_is_unavailable() {
        let source = FileSource::new(SourceKind::File, PathBuf::from("/nonexistent.json"));
        let err = source.search(&query("data", "", 7)).await.unwrap_err();
        assert!(matches!(err, SourceError::Unavailable(_)));
    }
}
