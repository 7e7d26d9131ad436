mod ai_guard;
mod config;
mod discovery;
mod errors;
mod llm_client;
mod memory;
mod models;
mod report_sink;
mod scoring;
mod session;
mod sources;
mod synthesis;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ai_guard::evaluator::HeuristicDetector;
use crate::ai_guard::humanize::HeuristicRewriter;
use crate::ai_guard::{DetectorOracle, RewriteOracle};
use crate::config::EngineConfig;
use crate::discovery::DiscoveryCoordinator;
use crate::llm_client::LlmClient;
use crate::memory::JsonMemoryStore;
use crate::models::listing::Criteria;
use crate::models::profile::Profile;
use crate::report_sink::JsonReportSink;
use crate::session::{cancel_pair, SessionRunner};
use crate::sources::file::FileSource;
use crate::sources::{SourceKind, SourceRegistry};
use crate::synthesis::GenerationOracle;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = EngineConfig::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting fit engine v{}", env!("CARGO_PKG_VERSION"));

    let registry = build_registry(&config);

    // Oracles: the LLM client when a key is configured, local heuristics
    // otherwise. The detector is always the local heuristic.
    let detector: Arc<dyn DetectorOracle> = Arc::new(HeuristicDetector);
    let (generator, rewriter): (Arc<dyn GenerationOracle>, Arc<dyn RewriteOracle>) =
        match &config.anthropic_api_key {
            Some(key) => {
                let client = LlmClient::new(key.clone());
                info!("LLM oracles initialized (model: {})", llm_client::MODEL);
                (Arc::new(client.clone()), Arc::new(client))
            }
            None => {
                warn!("ANTHROPIC_API_KEY not set, using heuristic oracles");
                (
                    Arc::new(OfflineGenerator),
                    Arc::new(HeuristicRewriter),
                )
            }
        };

    let profile = load_profile(&config).await?;
    info!(
        memory_entries = profile.memory_entries.len(),
        "profile loaded"
    );

    let runner = SessionRunner {
        discovery: DiscoveryCoordinator::new(
            registry,
            config.source_priority.clone(),
            config.widening.clone(),
        ),
        generator,
        detector,
        rewriter,
        memory: Arc::new(JsonMemoryStore::new(config.data_dir.clone())),
        reports: Arc::new(JsonReportSink::new(config.reports_dir.clone())),
        config: config.clone(),
    };

    let criteria = Criteria {
        role: config.search_role.clone(),
        function: config.search_function.clone(),
        country: config.search_country.clone(),
        source_preference: None,
    };

    let (handle, cancel) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("ctrl-c received, finishing in-flight work then stopping");
            handle.cancel();
        }
    });

    let report = runner.run(criteria, profile, cancel).await?;
    info!(
        session = %report.session_id,
        found = report.results_found,
        generated = report.generated_count(),
        failed = report.failed_count(),
        cancelled = report.cancelled,
        "done"
    );

    Ok(())
}

/// Register job sources. The listings file (explicit fixture or the data-dir
/// default) serves every source kind in the priority list — the widening
/// schedule only emits variants for priority kinds, so a source registered
/// under any other kind would never be queried.
fn build_registry(config: &EngineConfig) -> SourceRegistry {
    let path = config
        .listings_fixture
        .clone()
        .unwrap_or_else(|| config.data_dir.join("listings.json"));
    let mut registry = SourceRegistry::new();
    for kind in &config.source_priority {
        registry.register(Arc::new(FileSource::new(*kind, path.clone())));
    }
    info!(listings = %path.display(), "file-backed sources registered");
    registry
}

async fn load_profile(config: &EngineConfig) -> Result<Profile> {
    let raw = tokio::fs::read_to_string(&config.profile_path)
        .await
        .with_context(|| {
            format!(
                "Failed to read profile from {}",
                config.profile_path.display()
            )
        })?;
    serde_json::from_str(&raw).context("Profile file is not valid JSON")
}

/// Offline generation: copies profile text into each section so the rest of
/// the pipeline (scoring, AI-Guard, reporting) can run without an API key.
struct OfflineGenerator;

#[async_trait::async_trait]
impl GenerationOracle for OfflineGenerator {
    async fn generate(
        &self,
        listing: &crate::models::listing::Listing,
        profile: &Profile,
        expected_sections: &[&str],
    ) -> Result<std::collections::HashMap<String, String>, crate::errors::OracleError> {
        let summary = if profile.cv.summary.is_empty() {
            profile.cv.raw.clone()
        } else {
            profile.cv.summary.clone()
        };
        let experience = profile
            .cv
            .experience
            .iter()
            .flat_map(|e| e.bullets.iter().cloned())
            .collect::<Vec<_>>()
            .join("\n");
        let cover = format!(
            "I am applying for the {} role at {}. {}",
            listing.title, listing.company, summary
        );

        Ok(expected_sections
            .iter()
            .map(|name| {
                let text = match *name {
                    "summary" => summary.clone(),
                    "experience" => experience.clone(),
                    _ => cover.clone(),
                };
                (name.to_string(), text)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::listing::Listing;
    use chrono::Utc;

    #[test]
    fn test_registry_serves_every_priority_kind_without_a_fixture() {
        let config = EngineConfig::default();
        let registry = build_registry(&config);
        for kind in &config.source_priority {
            assert!(registry.get(*kind).is_some(), "missing source for {kind}");
        }
    }

    // The default wiring (no fixture, data-dir listings file) must actually
    // reach the listings on disk through the widening schedule.
    #[tokio::test]
    async fn test_default_wiring_discovers_from_data_dir_listings() {
        let dir = tempfile::TempDir::new().unwrap();
        let listing = Listing {
            source: SourceKind::File,
            external_id: "a".to_string(),
            title: "Data Engineer".to_string(),
            company: "Acme".to_string(),
            location: "ch".to_string(),
            posted_at: Utc::now(),
            description: "data engineer pipelines".to_string(),
            normalized_description: None,
        };
        tokio::fs::write(
            dir.path().join("listings.json"),
            serde_json::to_vec(&vec![listing]).unwrap(),
        )
        .await
        .unwrap();

        let mut config = EngineConfig::default();
        config.data_dir = dir.path().to_path_buf();

        let coordinator = DiscoveryCoordinator::new(
            build_registry(&config),
            config.source_priority.clone(),
            config.widening.clone(),
        );
        let criteria = Criteria {
            role: config.search_role.clone(),
            function: config.search_function.clone(),
            country: config.search_country.clone(),
            source_preference: None,
        };
        let (_handle, cancel) = cancel_pair();

        let outcome = coordinator
            .discover(&criteria, 1, config.max_discovery_attempts, &cancel)
            .await
            .unwrap();
        assert_eq!(outcome.listings.len(), 1);
        assert_eq!(outcome.listings[0].external_id, "a");
    }
}
