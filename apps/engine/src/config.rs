use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::discovery::widening::WideningConfig;
use crate::sources::SourceKind;

/// Engine configuration loaded from environment variables. Everything has a
/// sensible default except the search criteria; an API key is optional and
/// its absence routes all oracle work to the built-in heuristics.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Compatibility score a listing must reach to be shortlisted (0..=10).
    pub compatibility_threshold: f64,
    /// Hard cap on shortlisted listings per session.
    pub max_docs: usize,
    /// AI-likeness score a section must reach for AI-Guard to stop early.
    pub ai_target_score: f64,
    /// Rewrite iterations per section after baseline scoring.
    pub ai_max_iters: u32,
    /// Minimum factual similarity a rewrite must keep.
    pub fact_similarity_floor: f64,
    /// Sections optimized concurrently per draft.
    pub section_fan_out: usize,
    /// Discovery keeps widening until at least this many listings are found.
    pub min_results: usize,
    /// Hard cap on discovery query variants per session.
    pub max_discovery_attempts: usize,
    pub source_priority: Vec<SourceKind>,
    pub widening: WideningConfig,
    pub search_role: String,
    pub search_function: String,
    pub search_country: String,
    pub anthropic_api_key: Option<String>,
    /// When set, a file-backed source reads listings from this JSON fixture
    /// instead of the network.
    pub listings_fixture: Option<PathBuf>,
    pub profile_path: PathBuf,
    pub data_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub rust_log: String,
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(EngineConfig {
            compatibility_threshold: parse_env("COMPATIBILITY_THRESHOLD", 7.5)?,
            max_docs: parse_env("MAX_DOCS", 5)?,
            ai_target_score: parse_env("AI_TARGET_SCORE", 35.0)?,
            ai_max_iters: parse_env("AI_MAX_ITERS", 3)?,
            fact_similarity_floor: parse_env("FACT_SIMILARITY_FLOOR", 0.55)?,
            section_fan_out: parse_env("SECTION_FAN_OUT", 4)?,
            min_results: parse_env("MIN_RESULTS", 5)?,
            max_discovery_attempts: parse_env("MAX_DISCOVERY_ATTEMPTS", 8)?,
            source_priority: parse_sources(std::env::var("SOURCES").ok().as_deref())?,
            widening: WideningConfig {
                base_days: parse_env("SEARCH_BASE_DAYS", 7)?,
                ..WideningConfig::default()
            },
            search_role: require_env("SEARCH_ROLE")?,
            search_function: require_env("SEARCH_FUNCTION")?,
            search_country: std::env::var("SEARCH_COUNTRY").unwrap_or_else(|_| "ch".to_string()),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
            listings_fixture: std::env::var("LISTINGS_FIXTURE").ok().map(PathBuf::from),
            profile_path: std::env::var("PROFILE_PATH")
                .unwrap_or_else(|_| "data/profile.json".to_string())
                .into(),
            data_dir: std::env::var("DATA_DIR")
                .unwrap_or_else(|_| "data".to_string())
                .into(),
            reports_dir: std::env::var("REPORTS_DIR")
                .unwrap_or_else(|_| "reports".to_string())
                .into(),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

#[cfg(test)]
impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            compatibility_threshold: 7.5,
            max_docs: 5,
            ai_target_score: 35.0,
            ai_max_iters: 3,
            fact_similarity_floor: 0.55,
            section_fan_out: 4,
            min_results: 5,
            max_discovery_attempts: 8,
            source_priority: SourceKind::DEFAULT_PRIORITY.to_vec(),
            widening: WideningConfig::default(),
            search_role: "Data Engineer".to_string(),
            search_function: "pipelines".to_string(),
            search_country: "ch".to_string(),
            anthropic_api_key: None,
            listings_fixture: None,
            profile_path: "data/profile.json".into(),
            data_dir: "data".into(),
            reports_dir: "reports".into(),
            rust_log: "info".to_string(),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        Err(_) => Ok(default),
    }
}

/// "indeed,jobup" style comma list; unset means the built-in priority order.
fn parse_sources(raw: Option<&str>) -> Result<Vec<SourceKind>> {
    match raw {
        None => Ok(SourceKind::DEFAULT_PRIORITY.to_vec()),
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<SourceKind>()
                    .with_context(|| format!("Unknown source '{s}' in SOURCES"))
            })
            .collect(),
    }
}
