//! Session report persistence. A session persists exactly one report, even
//! when it was cancelled or every listing failed — the report is the audit
//! artifact, so a partial run still leaves one behind.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use crate::models::report::SessionReport;

#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Write the report, returning where it landed.
    async fn persist(&self, report: &SessionReport) -> anyhow::Result<PathBuf>;
}

/// Writes one pretty-printed JSON file per session under the reports
/// directory, named by date and session id so runs never overwrite each
/// other.
pub struct JsonReportSink {
    dir: PathBuf,
}

impl JsonReportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ReportSink for JsonReportSink {
    async fn persist(&self, report: &SessionReport) -> anyhow::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let filename = format!(
            "session_report_{}_{}.json",
            report.started_at.format("%Y%m%d"),
            report.session_id
        );
        let path = self.dir.join(filename);
        let raw = serde_json::to_string_pretty(report)?;
        tokio::fs::write(&path, raw).await?;
        info!(path = %path.display(), "session report written");
        Ok(path)
    }
}
